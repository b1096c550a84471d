use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One forecast data point, roughly covering a 3-hour window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub icon: String,
    pub description: String,
}

/// Raw forecast for a city as returned by a provider.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub city_name: String,
    /// Offset of the city's local time from UTC.
    pub utc_offset_seconds: i32,
    pub samples: Vec<ForecastSample>,
}

/// Aggregated min/max record for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(rename = "date_key")]
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub icon: String,
    pub description: String,
}

impl DailySummary {
    /// ISO `YYYY-MM-DD` key of the day.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Entry of the recent-search history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub temp: f64,
    pub icon: String,
    pub description: String,
}

/// Current conditions for a city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub temp: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub icon: String,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

impl CurrentConditions {
    pub fn to_location_record(&self) -> LocationRecord {
        LocationRecord {
            name: self.name.clone(),
            temp: self.temp,
            icon: self.icon.clone(),
            description: self.description.clone(),
        }
    }
}

/// Everything a single search produces.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub days: Vec<DailySummary>,
    pub history: Vec<LocationRecord>,
}
