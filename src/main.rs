use anyhow::Result;
use nimbus_core::{AppError, Config};
use nimbus_weather::{OpenWeatherSource, WeatherCache};

#[tokio::main]
async fn main() -> Result<()> {
    nimbus_core::init()?;

    let locations: Vec<String> = std::env::args().skip(1).collect();
    if locations.is_empty() {
        println!("Usage: nimbus <location>...");
        return Ok(());
    }

    let config = Config::load_validated().inspect_err(|e| eprintln!("{}", e.user_message()))?;

    let source = OpenWeatherSource::new(config.weather.source_settings()).map_err(AppError::from)?;
    let cache = WeatherCache::new(source);

    tracing::info!("Looking up weather for {} location(s)", locations.len());

    // Second pass is served from cache.
    for pass in 1..=2 {
        for location in &locations {
            match cache.get_weather_info(location).await {
                Some(record) => println!("[{}] {}", pass, record),
                None => println!("[{}] {}: no weather data", pass, location),
            }
        }
    }

    Ok(())
}
