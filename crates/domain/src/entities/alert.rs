//! Weather alert entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared three-level alert severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational
    Minor,
    /// Be prepared
    Moderate,
    /// Take action
    Severe,
}

impl AlertSeverity {
    /// Get a human-readable label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active weather alert for a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherAlert {
    /// Event name, e.g. "Winter Storm Warning"
    pub event: String,
    /// One-line headline
    pub headline: String,
    /// Full description text
    pub description: String,
    /// Severity on the shared scale
    pub severity: AlertSeverity,
    /// When the alert expires, if known
    pub expires: Option<DateTime<Utc>>,
}

impl WeatherAlert {
    /// Whether the alert is still in force at `now`
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_none_or(|expires| expires > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn severity_ordering() {
        assert!(AlertSeverity::Severe > AlertSeverity::Moderate);
        assert!(AlertSeverity::Moderate > AlertSeverity::Minor);
    }

    #[test]
    fn severity_display() {
        assert_eq!(AlertSeverity::Severe.to_string(), "Severe");
        assert_eq!(
            serde_json::to_string(&AlertSeverity::Minor).unwrap(),
            "\"minor\""
        );
    }

    #[test]
    fn active_until_expiry() {
        let now = Utc::now();
        let alert = WeatherAlert {
            event: "Wind Advisory".to_string(),
            headline: "Wind Advisory until 6 PM".to_string(),
            description: String::new(),
            severity: AlertSeverity::Moderate,
            expires: Some(now + Duration::hours(2)),
        };
        assert!(alert.is_active_at(now));
        assert!(!alert.is_active_at(now + Duration::hours(3)));

        let open_ended = WeatherAlert {
            expires: None,
            ..alert
        };
        assert!(open_ended.is_active_at(now + Duration::days(30)));
    }
}
