//! Core library for the `skycast` weather lookup app.
//!
//! This crate defines:
//! - Configuration & API key handling
//! - The OpenWeather HTTP client (current weather, forecast, city
//!   suggestions)
//! - The daily forecast aggregator
//! - Preference persistence (theme flag, favorites list)
//! - The application state store driving any presentation layer
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or
//! front ends.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod persist;
pub mod provider;
pub mod store;

pub use config::Config;
pub use error::{FetchError, PersistError};
pub use forecast::{daily_summaries, daily_summaries_in};
pub use model::{DailySummary, FavoriteCity, ForecastEntry, Suggestion, Theme, WeatherSnapshot};
pub use persist::{FileStore, MemoryStore, PreferenceStore};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use store::{Action, AppState, Store};
