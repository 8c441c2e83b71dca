use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{Coordinate, CurrentOutcome, ForecastWindow};

pub mod openweather;

/// A weather data source feeding the rainbow predicate.
///
/// Implementations recover their own failures at this boundary:
/// `fetch_current` reports them as an explicit [`FetchFailure`] value and
/// `fetch_forecast` degrades to an empty window. Nothing escapes as an
/// error past these methods.
///
/// [`FetchFailure`]: crate::model::FetchFailure
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One current-conditions request for the coordinate.
    async fn fetch_current(&self, coordinate: &Coordinate) -> CurrentOutcome;

    /// One short-range forecast request (3-hour buckets) for the coordinate.
    async fn fetch_forecast(&self, coordinate: &Coordinate) -> ForecastWindow;
}
