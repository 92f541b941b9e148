use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WeatherError;

/// How long a freshly fetched record stays valid.
pub const RECORD_TTL_MINUTES: i64 = 5;

/// Validity window stamped onto every record the source produces.
pub fn record_ttl() -> Duration {
    Duration::minutes(RECORD_TTL_MINUTES)
}

/// Measurement system requested from the weather API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Kelvin, meters/sec
    Standard,
    /// Celsius, meters/sec
    #[default]
    Metric,
    /// Fahrenheit, miles/hour
    Imperial,
}

impl Units {
    /// Value of the `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

/// Observed conditions for one location.
///
/// Values are taken as reported; no range checks are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Short label, like "Clouds" or "Rain"
    pub short_description: String,
    /// Full description, like "broken clouds"
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub wind_speed: f64,
    pub pressure: f64,
}

/// Snapshot of the weather at one location, valid until `expires_at`.
///
/// Records are never updated in place; a stale record is replaced by a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    location: String,
    conditions: Conditions,
    expires_at: DateTime<Utc>,
}

impl WeatherRecord {
    /// Create a record with an explicit expiry instant.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::InvalidArgument` if `location` is blank.
    pub fn new(
        location: impl Into<String>,
        conditions: Conditions,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, WeatherError> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(WeatherError::InvalidArgument(
                "location must not be blank".to_string(),
            ));
        }

        Ok(Self {
            location,
            conditions,
            expires_at,
        })
    }

    /// Create a record fetched at `fetched_at`, expiring one TTL window later.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::InvalidArgument` if `location` is blank.
    pub fn fetched_at(
        location: impl Into<String>,
        conditions: Conditions,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, WeatherError> {
        Self::new(location, conditions, fetched_at + record_ttl())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn short_description(&self) -> &str {
        &self.conditions.short_description
    }

    pub fn description(&self) -> &str {
        &self.conditions.description
    }

    pub fn temperature(&self) -> f64 {
        self.conditions.temperature
    }

    pub fn feels_like(&self) -> f64 {
        self.conditions.feels_like
    }

    pub fn wind_speed(&self) -> f64 {
        self.conditions.wind_speed
    }

    pub fn pressure(&self) -> f64 {
        self.conditions.pressure
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// A record is stale once `now` reaches its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Display for WeatherRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}), temperature {}, feels like {}, wind {}, pressure {}, expires {}",
            self.location,
            self.conditions.short_description,
            self.conditions.description,
            self.conditions.temperature,
            self.conditions.feels_like,
            self.conditions.wind_speed,
            self.conditions.pressure,
            self.expires_at.to_rfc3339(),
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::TimeZone;

    fn cloudy() -> Conditions {
        Conditions {
            short_description: "Cloudy".to_string(),
            description: "Cool and cloudy".to_string(),
            temperature: 17.2,
            feels_like: 13.5,
            wind_speed: 3.5,
            pressure: 287.3,
        }
    }

    #[test]
    fn test_accessors() {
        let expires = Utc.with_ymd_and_hms(2021, 9, 30, 12, 12, 12).unwrap();
        let record = WeatherRecord::new("Moscow", cloudy(), expires).unwrap();

        assert_eq!(record.location(), "Moscow");
        assert_eq!(record.short_description(), "Cloudy");
        assert_eq!(record.description(), "Cool and cloudy");
        assert_eq!(record.temperature(), 17.2);
        assert_eq!(record.feels_like(), 13.5);
        assert_eq!(record.wind_speed(), 3.5);
        assert_eq!(record.pressure(), 287.3);
        assert_eq!(record.expires_at(), expires);
    }

    #[test]
    fn test_blank_location_rejected() {
        let result = WeatherRecord::new("  ", cloudy(), Utc::now());
        assert!(matches!(result, Err(WeatherError::InvalidArgument(_))));
    }

    #[test]
    fn test_out_of_range_values_accepted() {
        let conditions = Conditions {
            temperature: -400.0,
            pressure: -1.0,
            ..cloudy()
        };
        let record = WeatherRecord::new("Nowhere", conditions, Utc::now()).unwrap();
        assert_eq!(record.temperature(), -400.0);
        assert_eq!(record.pressure(), -1.0);
    }

    #[test]
    fn test_fetched_at_stamps_ttl() {
        let fetched = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let record = WeatherRecord::fetched_at("Omsk", cloudy(), fetched).unwrap();
        assert_eq!(record.expires_at(), fetched + Duration::minutes(5));
    }

    #[test]
    fn test_expiry_boundary_is_stale() {
        let expires = Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap();
        let record = WeatherRecord::new("Omsk", cloudy(), expires).unwrap();

        assert!(!record.is_expired_at(expires - Duration::milliseconds(1)));
        assert!(record.is_expired_at(expires));
        assert!(record.is_expired_at(expires + Duration::seconds(1)));
    }

    #[test]
    fn test_display_lists_all_fields() {
        let expires = Utc.with_ymd_and_hms(2021, 9, 30, 12, 12, 12).unwrap();
        let record = WeatherRecord::new("Moscow", cloudy(), expires).unwrap();
        let text = record.to_string();

        for part in ["Moscow", "Cloudy", "Cool and cloudy", "17.2", "13.5", "3.5", "287.3", "2021-09-30"] {
            assert!(text.contains(part), "missing {part} in {text}");
        }
    }

    #[test]
    fn test_debug_lists_all_fields() {
        let record = WeatherRecord::new("Moscow", cloudy(), Utc::now()).unwrap();
        let text = format!("{:?}", record);
        assert!(text.contains("location"));
        assert!(text.contains("feels_like"));
        assert!(text.contains("expires_at"));
    }

    #[test]
    fn test_units_serialization() {
        assert_eq!(serde_json::to_string(&Units::Imperial).unwrap(), "\"imperial\"");
        assert_eq!(Units::default(), Units::Metric);
        assert_eq!(Units::Standard.as_query(), "standard");
    }
}
