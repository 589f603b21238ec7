use crate::{Config, error::NetworkError, model::Coordinate, provider::openmeteo::OpenMeteoProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};

pub mod openmeteo;

/// Current conditions block, exactly as the provider reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub weathercode: i32,
    /// Local ISO time without offset, e.g. `2024-01-01T12:00`.
    pub time: String,
}

/// Provider response body for a `current_weather=true` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawWeather {
    pub current_weather: RawCurrentWeather,
    pub timezone: String,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, coordinates: Coordinate) -> Result<RawWeather, NetworkError>;
}

/// Construct the provider described by config.
pub fn provider_from_config(config: &Config) -> Arc<dyn WeatherProvider> {
    Arc::new(OpenMeteoProvider::new(config.weather.base_url.clone()))
}
