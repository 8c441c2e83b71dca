use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A geographic point, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> anyhow::Result<Self> {
        ensure!(
            (-90.0..=90.0).contains(&latitude),
            "latitude must be between -90 and 90, got {latitude}"
        );
        ensure!(
            (-180.0..=180.0).contains(&longitude),
            "longitude must be between -180 and 180, got {longitude}"
        );

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A single point-in-time weather reading, normalized to metric units.
///
/// Serializes to the `current_weather` object of the client payload under
/// exactly these field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub weather_main: String,
    pub weather_description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub city_name: String,
    pub country: String,
    pub weather_icon: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Why a fetch produced no snapshot.
///
/// A first-class value the caller branches on, not an escaping error:
/// fetchers recover every provider failure into one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("weather provider returned status {status}")]
    Status { status: u16 },
    #[error("weather request failed: {message}")]
    Transport { message: String },
    #[error("weather response could not be parsed: {message}")]
    Payload { message: String },
}

impl FetchFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload { message: message.into() }
    }
}

/// Result of a current-conditions fetch: a snapshot or a recovered failure.
pub type CurrentOutcome = Result<WeatherSnapshot, FetchFailure>;

/// One 3-hour forecast bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub condition: String,
    pub description: String,
    pub temperature: f64,
    /// Precipitation volume for the bucket in millimetres; 0.0 when the
    /// provider omits the rain field.
    pub precipitation_mm: f64,
}

impl ForecastEntry {
    pub fn indicates_rain(&self) -> bool {
        self.condition == "Rain" || self.precipitation_mm > 0.0
    }
}

/// Ordered sequence of forecast buckets, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastWindow {
    entries: Vec<ForecastEntry>,
}

impl ForecastWindow {
    /// Entries are sorted on construction; timestamps stay monotonically
    /// non-decreasing even against a misbehaving provider.
    pub fn new(mut entries: Vec<ForecastEntry>) -> Self {
        entries.sort_by_key(|entry| entry.timestamp);
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any bucket strictly before `cutoff` carries rain evidence.
    pub fn has_rain_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.timestamp < cutoff && entry.indicates_rain())
    }
}

/// Payload rendered to the client after a successful evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct RainbowReport {
    pub current_weather: WeatherSnapshot,
    pub rainbow_possible: bool,
    pub message: String,
}
