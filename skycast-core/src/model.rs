use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One geocoding match for a partial city query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions for the single displayed city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Stable city identifier assigned by the provider.
    pub city_id: i64,
    pub name: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: u32,
    pub condition_main: String,
    pub condition_description: String,
}

/// One 3-hour forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition_main: String,
    pub condition_description: String,
}

/// Aggregate of all forecast samples sharing one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    /// Condition of the first sample seen for this date.
    pub condition_main: String,
    pub condition_description: String,
}

/// A city pinned by the user. Persisted; keyed by the provider's city id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteCity {
    pub id: i64,
    pub name: String,
    pub country: String,
}

impl FavoriteCity {
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        Self {
            id: snapshot.city_id,
            name: snapshot.name.clone(),
            country: snapshot.country.clone(),
        }
    }
}

/// Visual theme derived from the persisted dark-mode flag.
///
/// The store only reports the current theme; applying it is up to the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode { Theme::Dark } else { Theme::Light }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorite_derives_from_snapshot() {
        let snapshot = WeatherSnapshot {
            city_id: 2643743,
            name: "London".to_string(),
            country: "GB".to_string(),
            temperature_c: 11.2,
            feels_like_c: 10.1,
            humidity_pct: 76,
            wind_speed_mps: 4.1,
            pressure_hpa: 1012,
            condition_main: "Clouds".to_string(),
            condition_description: "overcast clouds".to_string(),
        };

        let favorite = FavoriteCity::from_snapshot(&snapshot);
        assert_eq!(favorite.id, 2643743);
        assert_eq!(favorite.name, "London");
        assert_eq!(favorite.country, "GB");
    }

    #[test]
    fn theme_maps_dark_mode_flag() {
        assert_eq!(Theme::from_dark_mode(false), Theme::Light);
        assert_eq!(Theme::from_dark_mode(true), Theme::Dark);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}
