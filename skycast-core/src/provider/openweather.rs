use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::model::{ForecastEntry, Suggestion, WeatherSnapshot};

use super::WeatherProvider;

const WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const GEO_BASE_URL: &str = "http://api.openweathermap.org/geo/1.0";

/// Maximum number of geocoding matches requested per lookup.
pub const SUGGESTION_LIMIT: usize = 5;

/// OpenWeather HTTP client covering current weather, the 5-day/3-hour
/// forecast, and direct geocoding for city suggestions.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    lang: String,
    http: Client,
    weather_base: String,
    geo_base: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, lang: String) -> Self {
        Self::with_base_urls(
            api_key,
            lang,
            WEATHER_BASE_URL.to_string(),
            GEO_BASE_URL.to_string(),
        )
    }

    /// Point the client at alternative endpoints, for tests against a local
    /// mock server.
    pub fn with_base_urls(
        api_key: String,
        lang: String,
        weather_base: String,
        geo_base: String,
    ) -> Self {
        Self {
            api_key,
            lang,
            http: Client::new(),
            weather_base,
            geo_base,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Api {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Map a not-found answer onto the dedicated error variant so callers can
    /// tell an unresolved city from an outage.
    fn city_scoped(err: FetchError, city: &str) -> FetchError {
        match err {
            FetchError::Api { status, .. } if status == StatusCode::NOT_FOUND => {
                FetchError::CityNotFound(city.to_string())
            }
            other => other,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/weather", self.weather_base);

        let parsed: OwCurrentResponse = self
            .get_json(
                &url,
                &[
                    ("q", city),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                    ("lang", self.lang.as_str()),
                ],
            )
            .await
            .map_err(|err| Self::city_scoped(err, city))?;

        let (condition_main, condition_description) = first_condition(&parsed.weather);

        Ok(WeatherSnapshot {
            city_id: parsed.id,
            name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            pressure_hpa: parsed.main.pressure,
            condition_main,
            condition_description,
        })
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, FetchError> {
        let url = format!("{}/forecast", self.weather_base);

        let parsed: OwForecastResponse = self
            .get_json(
                &url,
                &[
                    ("q", city),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                    ("lang", self.lang.as_str()),
                ],
            )
            .await
            .map_err(|err| Self::city_scoped(err, city))?;

        let entries = parsed
            .list
            .into_iter()
            .map(|entry| {
                let (condition_main, condition_description) = first_condition(&entry.weather);
                ForecastEntry {
                    timestamp: unix_to_utc(entry.dt),
                    temperature_c: entry.main.temp,
                    condition_main,
                    condition_description,
                }
            })
            .collect();

        Ok(entries)
    }

    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, FetchError> {
        let url = format!("{}/direct", self.geo_base);
        let limit = SUGGESTION_LIMIT.to_string();

        let parsed: Vec<OwGeoMatch> = self
            .get_json(
                &url,
                &[
                    ("q", query),
                    ("limit", limit.as_str()),
                    ("appid", self.api_key.as_str()),
                ],
            )
            .await?;

        Ok(parsed
            .into_iter()
            .map(|m| Suggestion {
                name: m.name,
                country: m.country.unwrap_or_default(),
                lat: m.lat,
                lon: m.lon,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: i64,
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    name: String,
    country: Option<String>,
    lat: f64,
    lon: f64,
}

fn first_condition(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()))
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        // Cut may not land on a char boundary; localized error bodies are
        // not ASCII.
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
