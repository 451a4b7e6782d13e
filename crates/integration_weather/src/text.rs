//! Free-text forecast parsing
//!
//! NWS and Environment Canada describe precipitation, cloud and wind in prose
//! ("Slight Chance Rain Showers", "10 to 15 mph"). These helpers turn that
//! prose into numbers.
//!
//! # Precipitation priority
//!
//! [`parse_precipitation_chance`] resolves a text in three steps and stops at
//! the first that applies:
//!
//! 1. An explicit number followed by `%` or `percent` ("chance of rain 40%").
//! 2. The first keyword in table order, regardless of where it appears in
//!    the text:
//!
//!    | keyword          | chance |
//!    |------------------|--------|
//!    | `slight chance`  | 20     |
//!    | `isolated`       | 20     |
//!    | `scattered`      | 30     |
//!    | `risk`           | 30     |
//!    | `chance`         | 40     |
//!    | `likely`         | 70     |
//!    | `occasional`     | 70     |
//!    | `periods of`     | 80     |
//!    | `rain`, `shower(s)`, `snow`, `sleet`, `drizzle`, `thunderstorm(s)`, `flurry`, `flurries` | 80 |
//!
//! 3. Otherwise 0.
//!
//! `slight chance` is listed before `chance`, so "Slight Chance Rain" is 20
//! even though the text also contains `chance`.
//!
//! # Cloud cover
//!
//! [`cloud_cover_from_text`] uses the same first-in-table rule:
//!
//! | keyword                                          | cover |
//! |--------------------------------------------------|-------|
//! | `fog`                                            | 100   |
//! | `mostly sunny`, `mainly sunny`, `mostly clear`, `mainly clear`, `a few clouds` | 25 |
//! | `partly`, `mix of sun and cloud`                 | 50    |
//! | `mostly cloudy`, `mainly cloudy`                 | 75    |
//! | `sunny`, `clear`                                 | 10    |
//! | `cloudy`, `overcast`                             | 90    |
//! | any precipitation word                           | 85    |
//! | nothing matched                                  | 50    |
//!
//! Keywords only match whole words: `clear` does not match "Clearing" and
//! `rain` does not match "Brainstorm".

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

use domain::units::clamp_percentage;

/// Precipitation words shared by the precipitation and cloud tables
const PRECIPITATION_WORDS: [&str; 10] = [
    "rain",
    "showers",
    "shower",
    "snow",
    "sleet",
    "drizzle",
    "thunderstorms",
    "thunderstorm",
    "flurries",
    "flurry",
];

/// Chance assigned to a bare precipitation word
const BARE_PRECIPITATION_CHANCE: u8 = 80;

/// Cloud cover assigned when a precipitation word is the only hint
const PRECIPITATION_CLOUD_COVER: u8 = 85;

/// Cloud cover used when the text carries no sky-condition keyword
pub const DEFAULT_CLOUD_COVER: u8 = 50;

const PRECIPITATION_QUALIFIERS: [(&str, u8); 8] = [
    ("slight chance", 20),
    ("isolated", 20),
    ("scattered", 30),
    ("risk", 30),
    ("chance", 40),
    ("likely", 70),
    ("occasional", 70),
    ("periods of", 80),
];

const SKY_CONDITIONS: [(&str, u8); 14] = [
    ("fog", 100),
    ("mostly sunny", 25),
    ("mainly sunny", 25),
    ("mostly clear", 25),
    ("mainly clear", 25),
    ("a few clouds", 25),
    ("partly", 50),
    ("mix of sun and cloud", 50),
    ("mostly cloudy", 75),
    ("mainly cloudy", 75),
    ("sunny", 10),
    ("clear", 10),
    ("cloudy", 90),
    ("overcast", 90),
];

/// Keywords with a value each; earlier entries win over later ones
struct KeywordTable {
    matcher: AhoCorasick,
    values: Vec<u8>,
}

impl KeywordTable {
    fn new(entries: &[(&str, u8)]) -> Self {
        let patterns: Vec<&str> = entries.iter().map(|(keyword, _)| *keyword).collect();
        #[allow(clippy::expect_used)] // Infallible with valid static patterns
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .expect("Failed to build keyword matcher");
        Self {
            matcher,
            values: entries.iter().map(|(_, value)| *value).collect(),
        }
    }

    /// Value of the highest-priority keyword present in `text`
    fn first_by_priority(&self, text: &str) -> Option<u8> {
        self.matcher
            .find_overlapping_iter(text)
            .filter(|m| is_whole_word(text, m.start(), m.end()))
            .map(|m| m.pattern().as_usize())
            .min()
            .and_then(|index| self.values.get(index).copied())
    }
}

static PRECIPITATION_TABLE: LazyLock<KeywordTable> = LazyLock::new(|| {
    let entries: Vec<(&str, u8)> = PRECIPITATION_QUALIFIERS
        .into_iter()
        .chain(
            PRECIPITATION_WORDS
                .into_iter()
                .map(|word| (word, BARE_PRECIPITATION_CHANCE)),
        )
        .collect();
    KeywordTable::new(&entries)
});

static CLOUD_TABLE: LazyLock<KeywordTable> = LazyLock::new(|| {
    let entries: Vec<(&str, u8)> = SKY_CONDITIONS
        .into_iter()
        .chain(
            PRECIPITATION_WORDS
                .into_iter()
                .map(|word| (word, PRECIPITATION_CLOUD_COVER)),
        )
        .collect();
    KeywordTable::new(&entries)
});

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let boundary = |at: Option<&u8>| at.is_none_or(|b| !b.is_ascii_alphabetic());
    boundary(start.checked_sub(1).and_then(|i| bytes.get(i))) && boundary(bytes.get(end))
}

/// Decimal numbers in `text` with their byte spans
fn numbers(text: &str) -> Vec<(usize, usize, f64)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            if let Ok(value) = text[start..i].parse::<f64>() {
                found.push((start, i, value));
            }
        } else {
            i += 1;
        }
    }
    found
}

/// First number directly followed by one of `units` (case-insensitive)
fn number_before_unit(text: &str, units: &[&str]) -> Option<f64> {
    numbers(text).into_iter().find_map(|(_, end, value)| {
        let rest = text[end..].trim_start().to_ascii_lowercase();
        units
            .iter()
            .any(|unit| rest.starts_with(unit))
            .then_some(value)
    })
}

/// Explicit percentage such as "40%" or "60 percent"
fn explicit_percentage(text: &str) -> Option<u8> {
    number_before_unit(text, &["%", "percent"]).map(clamp_percentage)
}

/// Probability of precipitation (0-100) described by `text`
///
/// See the module documentation for the priority order.
#[must_use]
pub fn parse_precipitation_chance(text: &str) -> u8 {
    explicit_percentage(text)
        .or_else(|| PRECIPITATION_TABLE.first_by_priority(text))
        .unwrap_or(0)
}

/// Whether `text` mentions any form of precipitation
#[must_use]
pub fn mentions_precipitation(text: &str) -> bool {
    PRECIPITATION_TABLE.first_by_priority(text).is_some()
}

/// Estimated cloud cover (0-100) from a sky-condition summary
#[must_use]
pub fn cloud_cover_from_text(text: &str) -> u8 {
    CLOUD_TABLE
        .first_by_priority(text)
        .unwrap_or(DEFAULT_CLOUD_COVER)
}

/// Lower and upper bound of a wind text like "10 to 15 mph" or "5 mph"
#[must_use]
pub fn parse_wind_speed(text: &str) -> Option<(f64, f64)> {
    let found = numbers(text);
    match found.as_slice() {
        [] => None,
        [(_, _, only)] => Some((*only, *only)),
        [(_, _, low), (_, _, high), ..] => Some((low.min(*high), low.max(*high))),
    }
}

/// Gust speed from phrases like "gusts as high as 35 mph" or "gusting to 40"
#[must_use]
pub fn parse_gust(text: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    ["gusts as high as", "gusting to", "gusts up to", "gusts to"]
        .iter()
        .find_map(|phrase| lower.find(phrase).map(|at| at + phrase.len()))
        .and_then(|after| numbers(&lower[after..]).first().map(|(_, _, v)| *v))
}

/// Expected snow accumulation in inches from an NWS detailed forecast
///
/// Ranges resolve to their upper bound: "2 to 4 inches" is 4.
#[must_use]
pub fn parse_snow_accumulation_inches(text: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    let at = lower.find("accumulation")?;
    let segment = &lower[at..];
    if segment.contains("less than half an inch") {
        return Some(0.25);
    }
    if segment.contains("less than one inch") || segment.contains("less than an inch") {
        return Some(0.5);
    }
    number_before_unit(segment, &["inch"]).or_else(|| {
        (segment.contains("around one inch") || segment.contains("around an inch")).then_some(1.0)
    })
}

/// Metric amount following `keyword`, e.g. "amount 10 to 15 mm"
///
/// Ranges resolve to their upper bound.
#[must_use]
pub fn parse_metric_amount(text: &str, keyword: &str, unit: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    let at = lower.find(keyword)?;
    number_before_unit(&lower[at..], &[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_percentage_wins() {
        assert_eq!(parse_precipitation_chance("chance of rain 40%"), 40);
        assert_eq!(parse_precipitation_chance("Slight chance of rain, 15 percent"), 15);
        assert_eq!(parse_precipitation_chance("Showers likely. Chance of precipitation is 60%."), 60);
    }

    #[test]
    fn slight_chance_beats_chance() {
        assert_eq!(parse_precipitation_chance("slight chance of rain"), 20);
        assert_eq!(parse_precipitation_chance("Slight Chance Rain Showers"), 20);
        assert_eq!(parse_precipitation_chance("chance of rain"), 40);
    }

    #[test]
    fn table_order_not_text_order() {
        // "likely" outranks the bare word "rain" even though it appears later
        assert_eq!(parse_precipitation_chance("Rain likely"), 70);
        // "scattered" outranks "chance"
        assert_eq!(parse_precipitation_chance("Chance of scattered showers"), 30);
        assert_eq!(parse_precipitation_chance("Isolated thunderstorms"), 20);
        assert_eq!(parse_precipitation_chance("Periods of snow"), 80);
        assert_eq!(parse_precipitation_chance("Occasional drizzle"), 70);
    }

    #[test]
    fn bare_precipitation_and_dry_text() {
        assert_eq!(parse_precipitation_chance("Rain"), 80);
        assert_eq!(parse_precipitation_chance("Flurries"), 80);
        assert_eq!(parse_precipitation_chance("Sunny"), 0);
        assert_eq!(parse_precipitation_chance(""), 0);
    }

    #[test]
    fn keywords_match_whole_words() {
        // "brain" must not count as rain
        assert_eq!(parse_precipitation_chance("Brainstorm"), 0);
        assert!(!mentions_precipitation("Mostly sunny"));
        assert!(mentions_precipitation("Light snow"));
        // "clear" must not match inside "Clearing"
        assert_eq!(cloud_cover_from_text("Clearing late this evening"), DEFAULT_CLOUD_COVER);
        assert_eq!(cloud_cover_from_text("Cloudy. Clearing late this evening"), 90);
        assert_eq!(parse_precipitation_chance("Rainbow"), 0);
    }

    #[test]
    fn env_canada_singular_phrasing() {
        assert_eq!(parse_precipitation_chance("Risk of a thunderstorm"), 30);
        assert_eq!(cloud_cover_from_text("Risk of a thunderstorm"), 85);
        assert_eq!(parse_precipitation_chance("Chance of a shower"), 40);
        assert!(mentions_precipitation("Chance of a shower"));
        assert_eq!(parse_precipitation_chance("A few flurries"), 80);
        assert_eq!(parse_precipitation_chance("Periods of light flurry"), 80);
        assert_eq!(cloud_cover_from_text("A few flurries"), 85);
        // "slight chance" still outranks "risk"
        assert_eq!(
            parse_precipitation_chance("Slight chance of rain. Risk of freezing rain"),
            20
        );
    }

    #[test]
    fn env_canada_mainly_sky_conditions() {
        assert_eq!(cloud_cover_from_text("Mainly cloudy"), 75);
        assert_eq!(cloud_cover_from_text("Mainly sunny"), 25);
        assert_eq!(cloud_cover_from_text("Mainly clear. Low minus 12."), 25);
    }

    #[test]
    fn cloud_cover_keywords() {
        assert_eq!(cloud_cover_from_text("Sunny"), 10);
        assert_eq!(cloud_cover_from_text("Clear"), 10);
        assert_eq!(cloud_cover_from_text("Mostly Sunny"), 25);
        assert_eq!(cloud_cover_from_text("Partly Cloudy"), 50);
        assert_eq!(cloud_cover_from_text("Mostly Cloudy"), 75);
        assert_eq!(cloud_cover_from_text("Cloudy"), 90);
        assert_eq!(cloud_cover_from_text("Patchy Fog"), 100);
        assert_eq!(cloud_cover_from_text("Rain Showers"), 85);
        assert_eq!(cloud_cover_from_text("A mix of sun and cloud"), 50);
        assert_eq!(cloud_cover_from_text("Breezy"), DEFAULT_CLOUD_COVER);
    }

    #[test]
    fn wind_speed_ranges() {
        assert_eq!(parse_wind_speed("10 to 15 mph"), Some((10.0, 15.0)));
        assert_eq!(parse_wind_speed("5 mph"), Some((5.0, 5.0)));
        assert_eq!(parse_wind_speed("Calm"), None);
        assert_eq!(parse_wind_speed("2.5 to 7 mph"), Some((2.5, 7.0)));
    }

    #[test]
    fn gusts() {
        assert_eq!(
            parse_gust("West wind 15 to 20 mph, with gusts as high as 35 mph."),
            Some(35.0)
        );
        assert_eq!(parse_gust("Wind gusting to 40"), Some(40.0));
        assert_eq!(parse_gust("Light wind."), None);
    }

    #[test]
    fn snow_accumulation() {
        assert_eq!(
            parse_snow_accumulation_inches("New snow accumulation of 2 to 4 inches possible."),
            Some(4.0)
        );
        assert_eq!(
            parse_snow_accumulation_inches("New snow accumulation of around 1 inch possible."),
            Some(1.0)
        );
        assert_eq!(
            parse_snow_accumulation_inches("New snow accumulation of less than one inch possible."),
            Some(0.5)
        );
        assert_eq!(parse_snow_accumulation_inches("Snow likely. Cold."), None);
    }

    #[test]
    fn metric_amounts() {
        assert_eq!(
            parse_metric_amount("Rain. Amount 10 to 15 mm.", "amount", "mm"),
            Some(15.0)
        );
        assert_eq!(
            parse_metric_amount("Flurries. Snowfall amount 2 cm.", "snowfall amount", "cm"),
            Some(2.0)
        );
        assert_eq!(parse_metric_amount("Cloudy.", "amount", "mm"), None);
    }
}
