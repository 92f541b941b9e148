pub mod config;
pub mod error;

pub use config::{Config, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError};

/// Initialize logging for the application
///
/// # Errors
///
/// Fails with `AppError::Other` if a global subscriber is already installed.
pub fn init() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| AppError::Other(anyhow::anyhow!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Nimbus core initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let _ = init();
        assert!(matches!(init(), Err(AppError::Other(_))));
    }
}
