use crate::error::FetchError;
use crate::model::{ForecastEntry, Suggestion, WeatherSnapshot};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Seam between the state store and the weather backend.
///
/// All three operations are stateless and idempotent; a single attempt is
/// made per call, with no retry or backoff.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a city name.
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, FetchError>;

    /// 5-day forecast in 3-hour samples, chronological.
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, FetchError>;

    /// Up to 5 geocoding matches for a partial city query, provider order.
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, FetchError>;
}
