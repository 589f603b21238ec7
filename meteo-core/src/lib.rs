//! Core library for the `meteo` weather widgets.
//!
//! This crate defines:
//! - Coordinate validation and the widget domain model
//! - The weather provider seam and the Open-Meteo client
//! - The bounded widget store, its persistence and the derived map view
//! - `WidgetController`, which keeps all of the above consistent
//!
//! It is used by `meteo-cli`, but any other presentation layer can drive the
//! controller and render its `ViewState`.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod map;
pub mod model;
pub mod persistence;
pub mod provider;
pub mod store;
pub mod validate;

pub use client::WeatherClient;
pub use config::Config;
pub use controller::{Banner, RestoreReport, ViewState, WidgetController};
pub use error::{NetworkError, WidgetError};
pub use map::{MapFrame, MapView};
pub use model::{CompassPoint, Coordinate, WeatherObservation, Widget, WidgetId};
pub use provider::WeatherProvider;
