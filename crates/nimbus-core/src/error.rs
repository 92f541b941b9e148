//! Centralized error types for the Nimbus application.
//!
//! Library crates keep their own error enums; this module wraps them so the
//! application has one type to report, with a `user_message()` for display.

use nimbus_weather::WeatherError;
use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration location not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration could not be serialized: {0}")]
    Serialize(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "No configuration directory is available on this system.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Serialize(_) => "Failed to save configuration.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = WeatherError::InvalidApiKey.into();
        assert!(matches!(app_err, AppError::Weather(WeatherError::InvalidApiKey)));

        let app_err: AppError = ConfigError::Invalid("weather.api_key: not set".into()).into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let app_err: AppError = io.into();
        assert!(app_err.user_message().contains("file operation"));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Weather(WeatherError::InvalidApiKey);
        assert_eq!(
            app_err.user_message(),
            "Weather API key is invalid. Check settings."
        );

        let app_err = AppError::Config(ConfigError::ParseError("line 1".into()));
        assert!(app_err.user_message().contains("malformed"));
    }

    #[test]
    fn test_display_keeps_detail() {
        let app_err = AppError::Config(ConfigError::Invalid("weather.api_key: not set".into()));
        assert!(app_err.to_string().contains("weather.api_key"));
    }
}
