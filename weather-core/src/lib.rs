//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Forecast aggregation (3-hour samples into daily summaries)
//! - The bounded recent-search history and its persistence
//! - Abstraction over the weather provider, with an OpenWeather client
//! - Search orchestration tying the pieces together
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod forecast;
pub mod history;
pub mod model;
pub mod provider;
pub mod service;

pub use config::Config;
pub use history::{History, HistoryStore, JsonFileStore, MemoryStore};
pub use model::{CurrentConditions, DailySummary, ForecastSample, LocationRecord, WeatherReport};
pub use provider::{ProviderError, WeatherProvider};
pub use service::{ForecastZone, SearchError, WeatherService};
