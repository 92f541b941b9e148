//! Weather lookups for Nimbus
//!
//! Current conditions come from the OpenWeatherMap API and are cached per
//! location for a fixed five-minute window.

pub mod cache;
pub mod clock;
pub mod error;
pub mod provider;
pub mod types;

pub use cache::WeatherCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::WeatherError;
pub use provider::{OpenWeatherSource, SourceSettings, WeatherSource};
pub use types::*;
