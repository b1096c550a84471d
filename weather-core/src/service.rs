//! One search: fetch current conditions and forecast together, aggregate
//! the forecast, record the visit.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    forecast,
    history::{History, HistoryStore},
    model::{DailySummary, Forecast, LocationRecord, WeatherReport},
    provider::{ProviderError, WeatherProvider},
};

/// Which clock decides where a forecast day starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForecastZone {
    /// The machine's local time zone.
    #[default]
    Local,
    /// The searched city's UTC offset, as reported by the provider.
    City,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("city name is empty")]
    EmptyQuery,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A newer search started before this one finished.
    #[error("search for '{city}' was superseded by a newer search")]
    Superseded { city: String },
}

#[derive(Debug)]
pub struct WeatherService<S: HistoryStore> {
    provider: Box<dyn WeatherProvider>,
    history: Arc<Mutex<History<S>>>,
    latest: AtomicU64,
    zone: ForecastZone,
}

impl<S: HistoryStore + 'static> WeatherService<S> {
    pub fn new(provider: Box<dyn WeatherProvider>, history: History<S>) -> Self {
        Self {
            provider,
            history: Arc::new(Mutex::new(history)),
            latest: AtomicU64::new(0),
            zone: ForecastZone::default(),
        }
    }

    pub fn with_zone(mut self, zone: ForecastZone) -> Self {
        self.zone = zone;
        self
    }

    pub async fn history(&self) -> Vec<LocationRecord> {
        self.history.lock().await.entries().to_vec()
    }

    pub async fn clear_history(&self) {
        self.with_history(|history| {
            history.clear();
            Vec::new()
        })
        .await;
    }

    /// Run a mutation (which persists through the store) on the blocking pool.
    async fn with_history<F>(&self, mutate: F) -> Vec<LocationRecord>
    where
        F: FnOnce(&mut History<S>) -> Vec<LocationRecord> + Send + 'static,
    {
        let history = Arc::clone(&self.history);
        tokio::task::spawn_blocking(move || mutate(&mut history.blocking_lock()))
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "search history update did not complete");
                Vec::new()
            })
    }

    pub async fn search(&self, city: &str) -> Result<WeatherReport, SearchError> {
        self.search_at(city, Utc::now()).await
    }

    /// Search with an explicit "now", which decides the excluded current day.
    #[instrument(skip(self, now))]
    pub async fn search_at(
        &self,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport, SearchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let (current, raw) =
            tokio::try_join!(self.provider.current(city), self.provider.forecast(city))
                .inspect_err(|err| warn!(error = %err, "weather lookup failed"))?;

        if self.latest.load(Ordering::SeqCst) != ticket {
            info!("discarding stale search result");
            return Err(SearchError::Superseded {
                city: city.to_string(),
            });
        }

        let days = self.daily_forecast(&raw, now);

        let record = current.to_location_record();
        let history = self
            .with_history(move |history| history.visit(record).to_vec())
            .await;

        info!(location = %current.name, days = days.len(), "search complete");

        Ok(WeatherReport {
            current,
            days,
            history,
        })
    }

    fn daily_forecast(&self, raw: &Forecast, now: DateTime<Utc>) -> Vec<DailySummary> {
        match self.zone {
            ForecastZone::Local => {
                let today = now.with_timezone(&Local).date_naive();
                forecast::aggregate(&raw.samples, today, &Local)
            }
            ForecastZone::City => {
                let offset = FixedOffset::east_opt(raw.utc_offset_seconds).unwrap_or_else(|| {
                    warn!(offset = raw.utc_offset_seconds, "invalid city offset, using UTC");
                    Utc.fix()
                });
                let today = now.with_timezone(&offset).date_naive();
                forecast::aggregate(&raw.samples, today, &offset)
            }
        }
    }
}
