use crate::{
    Config,
    model::{CurrentConditions, Forecast},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Failure to get data from the weather provider. Callers treat every
/// variant as "no data".
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, unexpected status, quota exceeded or bad payload.
    #[error("weather provider unavailable: {0}")]
    Unavailable(String),

    /// The provider does not know the requested city.
    #[error("no weather data found for '{city}'")]
    NotFound { city: String },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<CurrentConditions, ProviderError>;

    async fn forecast(&self, city: &str) -> Result<Forecast, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::new(api_key.to_owned(), config)?;

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let cfg = Config {
            api_key: Some("KEY".to_string()),
            ..Config::default()
        };

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn not_found_message_names_city() {
        let err = ProviderError::NotFound {
            city: "Atlantis".into(),
        };
        assert_eq!(err.to_string(), "no weather data found for 'Atlantis'");
    }
}
