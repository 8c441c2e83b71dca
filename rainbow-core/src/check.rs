use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::model::{Coordinate, CurrentOutcome, FetchFailure, ForecastWindow, RainbowReport};
use crate::provider::{WeatherProvider, openweather::OpenWeatherProvider};
use crate::rainbow;

const RAINBOW_MESSAGE: &str = "A rainbow may be out right now!";
const NO_RAINBOW_MESSAGE: &str = "Conditions are not right for a rainbow at the moment.";

/// One rainbow evaluation against live weather data.
///
/// Each instance memoizes at most one current-conditions result and one
/// forecast window, so the predicate and the raw weather payload can both
/// read them without duplicate network calls. Failed fetches are memoized
/// the same way. Construct a fresh check per external request; nothing is
/// shared or expired across instances.
#[derive(Debug)]
pub struct RainbowCheck {
    coordinate: Coordinate,
    provider: Box<dyn WeatherProvider>,
    current: OnceCell<CurrentOutcome>,
    forecast: OnceCell<ForecastWindow>,
}

impl RainbowCheck {
    pub fn new(provider: Box<dyn WeatherProvider>, coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            provider,
            current: OnceCell::new(),
            forecast: OnceCell::new(),
        }
    }

    /// Build a check backed by the OpenWeather provider.
    ///
    /// Errors here are configuration errors (missing credential), surfaced
    /// before any network traffic.
    pub fn from_config(config: &Config, coordinate: Coordinate) -> Result<Self> {
        let provider = OpenWeatherProvider::from_config(config)?;
        Ok(Self::new(Box::new(provider), coordinate))
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Current conditions, fetched at most once per instance.
    pub async fn current_weather(&self) -> &CurrentOutcome {
        self.current
            .get_or_init(|| self.provider.fetch_current(&self.coordinate))
            .await
    }

    /// Forecast window, fetched at most once per instance; empty when the
    /// provider could not supply one.
    pub async fn forecast(&self) -> &ForecastWindow {
        self.forecast
            .get_or_init(|| self.provider.fetch_forecast(&self.coordinate))
            .await
    }

    /// Evaluate the predicate at `now` over the memoized fetches.
    pub async fn is_rainbow_possible(&self, now: DateTime<Utc>) -> bool {
        let (current, forecast) = tokio::join!(self.current_weather(), self.forecast());
        rainbow::is_rainbow_possible(current, forecast, now)
    }

    /// Run the full check and build the client-facing report.
    ///
    /// A current-conditions failure is handed back to the caller; a missing
    /// forecast only weakens the moisture evidence.
    pub async fn report(&self, now: DateTime<Utc>) -> Result<RainbowReport, FetchFailure> {
        let (current, forecast) = tokio::join!(self.current_weather(), self.forecast());

        let snapshot = match current {
            Ok(snapshot) => snapshot.clone(),
            Err(failure) => return Err(failure.clone()),
        };

        let rainbow_possible = rainbow::is_rainbow_possible(current, forecast, now);
        let message = if rainbow_possible { RAINBOW_MESSAGE } else { NO_RAINBOW_MESSAGE };

        Ok(RainbowReport {
            current_weather: snapshot,
            rainbow_possible,
            message: message.to_string(),
        })
    }
}
