use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rainbow_core::{Config, Coordinate, OpenWeatherProvider, RainbowCheck};
use tracing::{info, warn};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "rainbow", version, about = "Rainbow conditions checker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the local config file.
    Configure,

    /// Check rainbow conditions once and print the JSON report.
    Check {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Re-check on an interval and announce when a rainbow becomes likely.
    Watch {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Seconds between checks.
        #[arg(long, default_value_t = 900)]
        interval: u64,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Check { lat, lon } => check(lat, lon).await,
            Command::Watch { lat, lon, interval } => watch(lat, lon, interval).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:")
        .prompt()
        .context("Failed to read API key from prompt")?;

    config.api_key = Some(api_key);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn check(lat: f64, lon: f64) -> Result<()> {
    let config = Config::load()?;
    let coordinate = Coordinate::new(lat, lon)?;
    let check = RainbowCheck::from_config(&config, coordinate)?;

    match check.report(Utc::now()).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(failure) => {
            // Mirror the service-unavailable payload the web handler renders.
            println!("{}", serde_json::json!({ "error": failure.to_string() }));
            Err(anyhow!("weather service unavailable"))
        }
    }
}

async fn watch(lat: f64, lon: f64, interval_secs: u64) -> Result<()> {
    let config = Config::load()?;
    let coordinate = Coordinate::new(lat, lon)?;
    let provider = OpenWeatherProvider::from_config(&config)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    info!(interval_secs, "watching for rainbow conditions");
    loop {
        ticker.tick().await;

        // Fresh check per tick: the memoized fetches live for exactly one
        // evaluation.
        let check = RainbowCheck::new(Box::new(provider.clone()), coordinate);
        match check.report(Utc::now()).await {
            Ok(report) if report.rainbow_possible => {
                println!(
                    "{} Look at the sky near {}!",
                    report.message, report.current_weather.city_name
                );
            }
            Ok(report) => {
                info!(
                    city = %report.current_weather.city_name,
                    condition = %report.current_weather.weather_main,
                    "no rainbow conditions"
                );
            }
            Err(failure) => {
                warn!(error = %failure, "weather check failed, will retry next tick");
            }
        }
    }
}
