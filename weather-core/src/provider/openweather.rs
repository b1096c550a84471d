use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    Config,
    model::{CurrentConditions, Forecast, ForecastSample, Units},
};

use super::{ProviderError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    language: String,
    units: Units,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, config: &Config) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            units: config.units,
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("lang", self.language.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                ProviderError::Unavailable(format!("OpenWeather {endpoint} request failed: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            ProviderError::Unavailable(format!("failed to read OpenWeather {endpoint} body: {e}"))
        })?;

        debug!(%status, endpoint, "OpenWeather responded");

        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound {
                city: city.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "OpenWeather {endpoint} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::Unavailable(format!("failed to parse OpenWeather {endpoint} JSON: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_max: f64,
    temp_min: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<CurrentConditions, ProviderError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city).await?;

        let weather = parsed.weather.into_iter().next().ok_or_else(|| {
            ProviderError::Unavailable("OpenWeather current response contained no conditions".into())
        })?;

        Ok(CurrentConditions {
            name: parsed.name,
            temp: parsed.main.temp,
            temp_max: parsed.main.temp_max,
            temp_min: parsed.main.temp_min,
            icon: weather.icon,
            description: weather.description,
            observed_at: DateTime::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now),
        })
    }

    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<Forecast, ProviderError> {
        let parsed: OwForecastResponse = self.get_json("forecast", city).await?;

        let samples = parsed
            .list
            .into_iter()
            .filter_map(|entry| {
                let weather = entry.weather.into_iter().next()?;
                Some(ForecastSample {
                    timestamp: entry.dt,
                    temp_max: entry.main.temp_max,
                    temp_min: entry.main.temp_min,
                    icon: weather.icon,
                    description: weather.description,
                })
            })
            .collect::<Vec<_>>();

        debug!(samples = samples.len(), "forecast parsed");

        Ok(Forecast {
            city_name: parsed.city.name,
            utc_offset_seconds: parsed.city.timezone,
            samples,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
