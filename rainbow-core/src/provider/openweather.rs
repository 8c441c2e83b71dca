use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::{API_KEY_ENV, Config};
use crate::model::{
    Coordinate, CurrentOutcome, FetchFailure, ForecastEntry, ForecastWindow, WeatherSnapshot,
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// A stalled provider must not hang the caller.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    language: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// Build a provider for the real OpenWeather endpoints.
    ///
    /// Fails fast on a blank credential; fetch calls never re-check it.
    pub fn new(api_key: impl Into<String>, language: impl Into<String>) -> Result<Self> {
        Self::build(api_key.into(), language.into(), DEFAULT_BASE_URL.to_string())
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_key()?, config.language())
    }

    #[cfg(test)]
    fn with_base_url(api_key: &str, language: &str, base_url: String) -> Result<Self> {
        Self::build(api_key.to_string(), language.to_string(), base_url)
    }

    fn build(api_key: String, language: String, base_url: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow!(
                "OpenWeather API key is empty.\n\
                 Hint: set {API_KEY_ENV} or run `rainbow-cli configure` first."
            ));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self { api_key, language, base_url, http })
    }

    async fn request_current(&self, coordinate: &Coordinate) -> CurrentOutcome {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let body = self.get(&url, coordinate).await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| FetchFailure::payload(format!("current weather JSON: {e}")))?;

        let sunrise = unix_to_utc(parsed.sys.sunrise)
            .ok_or_else(|| FetchFailure::payload("sunrise timestamp out of range"))?;
        let sunset = unix_to_utc(parsed.sys.sunset)
            .ok_or_else(|| FetchFailure::payload("sunset timestamp out of range"))?;

        let (weather_main, weather_description, weather_icon) =
            match parsed.weather.into_iter().next() {
                Some(w) => (w.main, w.description, w.icon),
                None => ("Unknown".to_string(), String::new(), String::new()),
            };

        Ok(WeatherSnapshot {
            temperature: parsed.main.temp,
            weather_main,
            weather_description,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            city_name: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            weather_icon,
            sunrise,
            sunset,
        })
    }

    async fn request_forecast(
        &self,
        coordinate: &Coordinate,
    ) -> Result<ForecastWindow, FetchFailure> {
        let url = format!("{}/data/2.5/forecast", self.base_url);
        let body = self.get(&url, coordinate).await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body)
            .map_err(|e| FetchFailure::payload(format!("forecast JSON: {e}")))?;

        let entries = parsed
            .list
            .into_iter()
            .filter_map(|item| {
                let timestamp = unix_to_utc(item.dt)?;
                let (condition, description) = match item.weather.into_iter().next() {
                    Some(w) => (w.main, w.description),
                    None => ("Unknown".to_string(), String::new()),
                };

                Some(ForecastEntry {
                    timestamp,
                    condition,
                    description,
                    temperature: item.main.temp,
                    precipitation_mm: item.rain.and_then(|r| r.volume_3h).unwrap_or(0.0),
                })
            })
            .collect();

        Ok(ForecastWindow::new(entries))
    }

    async fn get(&self, url: &str, coordinate: &Coordinate) -> Result<String, FetchFailure> {
        let query = [
            ("lat", coordinate.latitude().to_string()),
            ("lon", coordinate.longitude().to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
            ("lang", self.language.clone()),
        ];

        let res = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FetchFailure::transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchFailure::Status { status: status.as_u16() });
        }

        res.text()
            .await
            .map_err(|e| FetchFailure::transport(e.to_string()))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current(&self, coordinate: &Coordinate) -> CurrentOutcome {
        let outcome = self.request_current(coordinate).await;
        if let Err(failure) = &outcome {
            warn!(error = %failure, "current conditions fetch failed");
        }
        outcome
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast(&self, coordinate: &Coordinate) -> ForecastWindow {
        match self.request_forecast(coordinate).await {
            Ok(window) => {
                debug!(entries = window.len(), "forecast fetched");
                window
            }
            Err(failure) => {
                warn!(error = %failure, "forecast fetch failed, continuing without it");
                ForecastWindow::empty()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "3h")]
    volume_3h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
