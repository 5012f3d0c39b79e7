use thiserror::Error;

/// Failures of the OpenWeather HTTP surface.
///
/// `CityNotFound` is kept distinct from the transport variants so the store
/// can show "city not found" instead of a generic retry message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider could not resolve the requested city name.
    #[error("city '{0}' was not found")]
    CityNotFound(String),

    /// The request could not be sent or its body could not be read.
    #[error("failed to reach the weather provider")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status other than not-found.
    #[error("weather provider returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the JSON shape we expect.
    #[error("failed to decode weather provider response")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_city_not_found(&self) -> bool {
        matches!(self, FetchError::CityNotFound(_))
    }
}

/// Failures of the preference persistence layer.
///
/// These never reach the presentation layer: callers log them and continue
/// with defaults or in-memory state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read persisted value '{key}'")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write persisted value '{key}'")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}
