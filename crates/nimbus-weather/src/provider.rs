//! Current-weather lookups against the OpenWeatherMap API.

use crate::clock::{Clock, SystemClock};
use crate::error::WeatherError;
use crate::types::{Conditions, Units, WeatherRecord};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Anything that can produce the current weather for a location.
///
/// `None` means no data is available, whether because the location is
/// unknown or because the lookup failed.
pub trait WeatherSource: Send + Sync {
    fn fetch(&self, location: &str) -> impl Future<Output = Option<WeatherRecord>> + Send;
}

impl<S: WeatherSource> WeatherSource for Arc<S> {
    fn fetch(&self, location: &str) -> impl Future<Output = Option<WeatherRecord>> + Send {
        (**self).fetch(location)
    }
}

/// Connection settings for [`OpenWeatherSource`]
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub api_key: String,
    pub base_url: String,
    pub units: Units,
    pub timeout: Duration,
}

impl SourceSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            units: Units::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    #[serde(default)]
    main: MainBlock,
    #[serde(default)]
    wind: WindBlock,
    #[serde(default)]
    weather: Vec<SummaryBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct SummaryBlock {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

impl From<CurrentWeatherResponse> for Conditions {
    fn from(body: CurrentWeatherResponse) -> Self {
        let (short_description, description) = body
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .unwrap_or_default();

        Self {
            short_description,
            description,
            temperature: body.main.temp,
            feels_like: body.main.feels_like,
            wind_speed: body.wind.speed,
            pressure: body.main.pressure,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    units: Units,
    clock: Arc<dyn Clock>,
}

impl OpenWeatherSource {
    /// # Errors
    ///
    /// Returns `WeatherError::Network` if the HTTP client cannot be built.
    pub fn new(settings: SourceSettings) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: settings.api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            units: settings.units,
            clock: Arc::new(SystemClock),
        })
    }

    /// Use `clock` when stamping record expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch the current weather, surfacing every failure.
    ///
    /// An unknown location yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank location
    /// - `InvalidApiKey` when the API rejects the key
    /// - `Api` for any other non-success status
    /// - `Network` / `Parse` for transport and body failures
    pub async fn fetch_current(&self, location: &str) -> Result<Option<WeatherRecord>, WeatherError> {
        if location.trim().is_empty() {
            return Err(WeatherError::InvalidArgument(
                "location must not be blank".to_string(),
            ));
        }

        let url = format!("{}/data/2.5/weather", self.base_url);
        tracing::debug!("Requesting current weather for {}", location);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_query()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Weather API has no data for {}", location);
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(WeatherError::InvalidApiKey);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: CurrentWeatherResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let record = WeatherRecord::fetched_at(location, parsed.into(), self.clock.now())?;
        Ok(Some(record))
    }
}

impl WeatherSource for OpenWeatherSource {
    async fn fetch(&self, location: &str) -> Option<WeatherRecord> {
        match self.fetch_current(location).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Weather fetch for {} failed: {}", location, e);
                None
            }
        }
    }
}
