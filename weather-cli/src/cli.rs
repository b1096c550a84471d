use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use tracing::warn;
use weather_core::{
    Config, History, HistoryStore, JsonFileStore, LocationRecord, MemoryStore, SearchError,
    WeatherService, model::Units, provider::provider_from_config, service::ForecastZone,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key, language and units.
    Configure,

    /// Show current weather and the daily forecast for a city.
    Show {
        /// City name.
        city: String,

        /// Split forecast days at the city's midnight instead of the local one.
        #[arg(long)]
        city_time: bool,
    },

    /// List recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Search repeatedly from a prompt.
    Interactive {
        /// Split forecast days at the city's midnight instead of the local one.
        #[arg(long)]
        city_time: bool,
    },
}

/// What a line typed at the interactive prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Quit,
    Ignore,
    Search(String),
}

fn parse_prompt(input: &str, history: &[LocationRecord]) -> PromptAction {
    let input = input.trim();
    if input.is_empty() {
        return PromptAction::Ignore;
    }
    if input == ":q" {
        return PromptAction::Quit;
    }

    // A number picks an entry of the recent-search list.
    if let Ok(n) = input.parse::<usize>() {
        if let Some(entry) = n.checked_sub(1).and_then(|i| history.get(i)) {
            return PromptAction::Search(entry.name.clone());
        }
    }

    PromptAction::Search(input.to_string())
}

type Service = WeatherService<Box<dyn HistoryStore>>;

fn open_history(config: &Config) -> History<Box<dyn HistoryStore>> {
    let store: Box<dyn HistoryStore> = match JsonFileStore::in_data_dir() {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!(error = %err, "history will not be persisted");
            Box::new(MemoryStore::new())
        }
    };
    History::open(store, config.history_capacity)
}

fn build_service(config: &Config, city_time: bool) -> anyhow::Result<Service> {
    let provider = provider_from_config(config)?;
    let zone = if city_time {
        ForecastZone::City
    } else {
        ForecastZone::Local
    };

    Ok(WeatherService::new(provider, open_history(config)).with_zone(zone))
}

/// Run one search and print the outcome. Failures are reported and leave
/// whatever was printed before as the current display.
async fn search_and_print(service: &Service, city: &str, units: Units) {
    match service.search(city).await {
        Ok(report) => {
            println!("{}\n", render::current(&report.current, units));
            println!("{}\n", render::forecast(&report.days, units));
            println!("{}", render::history(&report.history, units));
        }
        Err(SearchError::Provider(err)) => println!("No data for '{}': {err}", city.trim()),
        Err(SearchError::EmptyQuery) => println!("Enter a city name."),
        Err(SearchError::Superseded { .. }) => {}
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current_key = config.api_key.clone().unwrap_or_default();
    let api_key = Text::new("OpenWeather API key:")
        .with_initial_value(&current_key)
        .prompt()?;

    let language = Text::new("Language for descriptions:")
        .with_initial_value(&config.language)
        .with_help_message("e.g. en, pt_br, es")
        .prompt()?;

    let start = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    config.api_key = Some(api_key.trim().to_string()).filter(|k| !k.is_empty());
    config.language = language.trim().to_string();
    config.units = units;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn interactive(service: Service, units: Units) -> anyhow::Result<()> {
    println!("{}", render::history(&service.history().await, units));

    loop {
        let prompt = tokio::task::spawn_blocking(|| {
            Text::new("City:")
                .with_help_message("number = recent search, :q = quit")
                .prompt()
        })
        .await
        .context("prompt task failed")?;

        let input = match prompt {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match parse_prompt(&input, &service.history().await) {
            PromptAction::Quit => break,
            PromptAction::Ignore => continue,
            PromptAction::Search(city) => {
                println!();
                search_and_print(&service, &city, units).await;
                println!();
            }
        }
    }

    Ok(())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let units = config.units;

        match self.command {
            Command::Configure => {
                tokio::task::spawn_blocking(move || configure(config))
                    .await
                    .context("configuration task failed")??;
            }
            Command::Show { city, city_time } => {
                let service = build_service(&config, city_time)?;
                search_and_print(&service, &city, units).await;
            }
            Command::History { clear } => {
                let mut history = open_history(&config);
                if clear {
                    history.clear();
                    println!("Recent searches cleared.");
                } else {
                    println!("{}", render::history(history.entries(), units));
                }
            }
            Command::Interactive { city_time } => {
                let service = build_service(&config, city_time)?;
                interactive(service, units).await?;
            }
        }

        Ok(())
    }
}
