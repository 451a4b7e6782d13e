//! Unit conversions into the metric system used by every normalized forecast

/// Miles per hour to kilometres per hour
pub const MPH_TO_KMH: f64 = 1.609_344;

/// Metres per second to kilometres per hour
pub const MPS_TO_KMH: f64 = 3.6;

/// Inches to centimetres
pub const INCH_TO_CM: f64 = 2.54;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert degrees Fahrenheit to Celsius
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Convert miles per hour to km/h
#[must_use]
pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * MPH_TO_KMH
}

/// Convert metres per second to km/h
#[must_use]
pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * MPS_TO_KMH
}

/// Convert inches to centimetres
#[must_use]
pub fn inches_to_cm(inches: f64) -> f64 {
    inches * INCH_TO_CM
}

/// Convert millimetres to centimetres
#[must_use]
pub fn mm_to_cm(mm: f64) -> f64 {
    mm / 10.0
}

/// Map a meteorological bearing (direction the wind blows from) onto a
/// 16-point compass label
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "N";
    }
    let normalized = degrees.rem_euclid(360.0);
    // 22.5 degree sectors centred on each point
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Clamp an arbitrary value into a 0-100 percentage
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_percentage(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
