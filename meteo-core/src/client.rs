//! Fetch + normalize: turns provider responses into [`WeatherObservation`]s.

use chrono::{NaiveDateTime, Utc};
use std::sync::Arc;

use crate::{
    error::NetworkError,
    model::{CompassPoint, Coordinate, WeatherCode, WeatherObservation},
    provider::{RawWeather, WeatherProvider},
};

const PROVIDER_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone)]
pub struct WeatherClient {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherClient {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, coordinates: Coordinate) -> Result<WeatherObservation, NetworkError> {
        let raw = self.provider.fetch_current(coordinates).await?;
        normalize(raw, coordinates, Utc::now().timestamp_millis())
    }
}

/// Map a provider response onto the canonical observation.
pub fn normalize(
    raw: RawWeather,
    coordinates: Coordinate,
    observed_at_epoch_ms: i64,
) -> Result<WeatherObservation, NetworkError> {
    let current = raw.current_weather;

    Ok(WeatherObservation {
        coordinates,
        temperature_c: current.temperature,
        wind_speed_kmh: current.windspeed,
        wind_direction: CompassPoint::from_bearing(current.winddirection),
        weather_code: WeatherCode(current.weathercode),
        local_time: format_local_time(&current.time)?,
        timezone: raw.timezone,
        observed_at_epoch_ms,
    })
}

/// `2024-01-01T12:00` -> `12:00`.
fn format_local_time(provider_time: &str) -> Result<String, NetworkError> {
    PROVIDER_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(provider_time, fmt).ok())
        .map(|t| t.format("%H:%M").to_string())
        .ok_or_else(|| NetworkError::Parse(format!("unrecognised observation time '{provider_time}'")))
}
