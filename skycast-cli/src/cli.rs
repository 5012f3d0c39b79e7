use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};

use skycast_core::{
    AppState, Config, FileStore, MemoryStore, OpenWeatherClient, PreferenceStore, Store,
    daily_summaries,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key used for all lookups.
    Configure,

    /// Show current conditions for a city.
    Show {
        /// City name, e.g. "London".
        city: String,

        /// Also print the 5-day outlook.
        #[arg(long)]
        forecast: bool,
    },

    /// Look up city name suggestions for a partial query.
    Search {
        /// At least two characters of a city name.
        query: String,
    },

    /// Manage pinned cities.
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },

    /// Switch between the light and dark theme.
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List pinned cities.
    List,

    /// Fetch `city` and pin it.
    Add { city: String },

    /// Unpin a city by its provider id.
    Remove { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Flip between light and dark.
    Toggle,

    /// Print the current theme.
    Show,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        if let Command::Configure = self.command {
            return configure();
        }

        let config = Config::load()?;
        if config.is_using_demo_key() {
            eprintln!(
                "note: using the shared demo API key; run `skycast configure` to set your own"
            );
        }

        let provider = Arc::new(OpenWeatherClient::new(
            config.resolved_api_key(),
            config.resolved_lang(),
        ));
        let prefs: Arc<dyn PreferenceStore> = match FileStore::new() {
            Some(store) => Arc::new(store),
            None => {
                tracing::warn!("no usable data directory, preferences will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        let store = Store::new(provider, prefs);

        match self.command {
            Command::Configure => unreachable!("handled above"),
            Command::Show { city, forecast } => {
                store.fetch_weather(Some(&city)).await;
                let state = store.snapshot();
                if let Some(message) = &state.error {
                    bail!("{message}");
                }
                print_weather(&state);
                if forecast {
                    print_forecast(&state);
                }
            }
            Command::Search { query } => {
                store.request_suggestions(&query).await;
                let state = store.snapshot();
                if let Some(message) = &state.error {
                    bail!("{message}");
                }
                if state.suggestions.is_empty() {
                    println!("No matches for '{query}'.");
                } else {
                    for suggestion in &state.suggestions {
                        println!(
                            "{}, {}  ({:.4}, {:.4})",
                            suggestion.name, suggestion.country, suggestion.lat, suggestion.lon
                        );
                    }
                }
            }
            Command::Favorites { command } => match command {
                FavoritesCommand::List => {
                    let state = store.snapshot();
                    if state.favorites.is_empty() {
                        println!("No favorite cities yet.");
                    }
                    for favorite in &state.favorites {
                        println!("{:>10}  {}, {}", favorite.id, favorite.name, favorite.country);
                    }
                }
                FavoritesCommand::Add { city } => {
                    store.fetch_weather(Some(&city)).await;
                    let state = store.snapshot();
                    if let Some(message) = &state.error {
                        bail!("{message}");
                    }
                    store.add_favorite();
                    let state = store.snapshot();
                    if let Some(weather) = &state.weather {
                        println!(
                            "Pinned {}, {} (id {}).",
                            weather.name, weather.country, weather.city_id
                        );
                    }
                }
                FavoritesCommand::Remove { id } => {
                    store.remove_favorite(id);
                    println!("Removed favorite {id} (if it was pinned).");
                }
            },
            Command::Theme { command } => match command {
                ThemeCommand::Toggle => {
                    store.toggle_theme();
                    println!("Theme is now {}.", store.theme());
                }
                ThemeCommand::Show => println!("{}", store.theme()),
            },
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:").prompt()?;
    let lang = inquire::Text::new("Language code:")
        .with_default(&config.resolved_lang())
        .prompt()?;

    config.api_key = Some(api_key.trim().to_string());
    config.lang = Some(lang.trim().to_string());
    config.save()?;

    println!("Saved to {}.", Config::config_file_path()?.display());
    Ok(())
}

fn print_weather(state: &AppState) {
    let Some(weather) = &state.weather else {
        println!("No weather data.");
        return;
    };

    println!(
        "{}, {} - {}",
        weather.name, weather.country, weather.condition_description
    );
    println!(
        "  temperature: {:.1}°C (feels like {:.1}°C)",
        weather.temperature_c, weather.feels_like_c
    );
    println!("  humidity:    {}%", weather.humidity_pct);
    println!("  wind:        {:.1} m/s", weather.wind_speed_mps);
    println!("  pressure:    {} hPa", weather.pressure_hpa);
    println!("  fetched:     {}", chrono::Local::now().format("%Y-%m-%d %H:%M"));
}

fn print_forecast(state: &AppState) {
    let summaries = daily_summaries(&state.forecast);
    if summaries.is_empty() {
        return;
    }

    println!();
    for summary in summaries {
        println!(
            "  {}  {:>5.1}°C .. {:>5.1}°C  {}",
            summary.date.format("%a %Y-%m-%d"),
            summary.temp_min_c,
            summary.temp_max_c,
            summary.condition_description
        );
    }
}
