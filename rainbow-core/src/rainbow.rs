//! The rainbow-possibility predicate.
//!
//! Pure over its three inputs; the current time is an explicit parameter so
//! the rule stays deterministic under test. The verdict is the conjunction
//! of three independent conditions:
//!
//! 1. the sky lets sunlight through (`Clear` or `Clouds`, partial cover is
//!    fine, active rain is not);
//! 2. the sun sits low: within two hours after sunrise or two hours before
//!    sunset;
//! 3. there is recent-moisture evidence: humidity above 70%, or a rain-ish
//!    forecast bucket within the next six hours as a proxy for rain nearby
//!    in time.

use chrono::{DateTime, Duration, Utc};

use crate::model::{CurrentOutcome, ForecastWindow, WeatherSnapshot};

const HUMIDITY_THRESHOLD: u8 = 70;
const SOLAR_WINDOW_HOURS: i64 = 2;
const MOISTURE_LOOKAHEAD_HOURS: i64 = 6;

/// Whether a rainbow is plausibly observable at `now`.
///
/// A failed current-conditions fetch is unconditionally `false`; an empty
/// forecast window only removes the forecast branch of the moisture check.
pub fn is_rainbow_possible(
    current: &CurrentOutcome,
    forecast: &ForecastWindow,
    now: DateTime<Utc>,
) -> bool {
    let Ok(snapshot) = current else {
        return false;
    };

    sky_allows_sunlight(snapshot)
        && within_solar_window(snapshot, now)
        && has_moisture_evidence(snapshot, forecast, now)
}

fn sky_allows_sunlight(snapshot: &WeatherSnapshot) -> bool {
    matches!(snapshot.weather_main.as_str(), "Clear" | "Clouds")
}

/// Low solar elevation, approximated from the provider's sunrise/sunset:
/// `[sunrise, sunrise + 2h)` or `(sunset - 2h, sunset]`.
fn within_solar_window(snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> bool {
    let window = Duration::hours(SOLAR_WINDOW_HOURS);
    let morning = now >= snapshot.sunrise && now < snapshot.sunrise + window;
    let evening = now > snapshot.sunset - window && now <= snapshot.sunset;

    morning || evening
}

fn has_moisture_evidence(
    snapshot: &WeatherSnapshot,
    forecast: &ForecastWindow,
    now: DateTime<Utc>,
) -> bool {
    snapshot.humidity > HUMIDITY_THRESHOLD
        || forecast.has_rain_before(now + Duration::hours(MOISTURE_LOOKAHEAD_HOURS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FetchFailure, ForecastEntry};
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, hour, minute, 0).unwrap()
    }

    /// Sunrise 06:00, sunset 18:00.
    fn snapshot(weather_main: &str, humidity: u8) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 21.0,
            weather_main: weather_main.to_string(),
            weather_description: String::new(),
            humidity,
            wind_speed: 2.0,
            city_name: "Shinjuku".to_string(),
            country: "JP".to_string(),
            weather_icon: "01d".to_string(),
            sunrise: at(6, 0),
            sunset: at(18, 0),
        }
    }

    fn rain_at(hour: u32) -> ForecastWindow {
        ForecastWindow::new(vec![ForecastEntry {
            timestamp: at(hour, 0),
            condition: "Rain".to_string(),
            description: "light rain".to_string(),
            temperature: 19.0,
            precipitation_mm: 0.4,
        }])
    }

    #[test]
    fn failed_fetch_is_never_a_rainbow() {
        let current: CurrentOutcome = Err(FetchFailure::Status { status: 503 });
        assert!(!is_rainbow_possible(&current, &rain_at(7), at(6, 30)));
    }

    #[test]
    fn rainy_sky_is_never_a_rainbow() {
        let current = Ok(snapshot("Rain", 90));
        assert!(!is_rainbow_possible(&current, &rain_at(7), at(6, 30)));
    }

    #[test]
    fn midday_is_never_a_rainbow() {
        let current = Ok(snapshot("Clear", 90));
        assert!(!is_rainbow_possible(&current, &rain_at(13), at(12, 0)));
    }

    #[test]
    fn humid_clear_morning_is_a_rainbow() {
        let current = Ok(snapshot("Clear", 80));
        assert!(is_rainbow_possible(&current, &ForecastWindow::empty(), at(6, 30)));
    }

    #[test]
    fn dry_clear_morning_without_forecast_is_not() {
        let current = Ok(snapshot("Clear", 40));
        assert!(!is_rainbow_possible(&current, &ForecastWindow::empty(), at(6, 30)));
    }

    #[test]
    fn cloudy_evening_with_rain_forecast_is_a_rainbow() {
        // Rain bucket three hours out, inside the six-hour lookahead.
        let current = Ok(snapshot("Clouds", 50));
        assert!(is_rainbow_possible(&current, &rain_at(20), at(17, 0)));
    }

    #[test]
    fn rain_forecast_beyond_the_lookahead_is_not_evidence() {
        let current = Ok(snapshot("Clouds", 50));
        assert!(!is_rainbow_possible(&current, &rain_at(23), at(17, 0)));
    }

    #[test]
    fn morning_window_starts_at_sunrise() {
        let current = Ok(snapshot("Clear", 80));
        assert!(is_rainbow_possible(&current, &ForecastWindow::empty(), at(6, 0)));
    }

    #[test]
    fn morning_window_upper_bound_is_exclusive() {
        let current = Ok(snapshot("Clear", 80));
        assert!(!is_rainbow_possible(&current, &ForecastWindow::empty(), at(8, 0)));
    }

    #[test]
    fn evening_window_lower_bound_is_exclusive() {
        let current = Ok(snapshot("Clear", 80));
        assert!(!is_rainbow_possible(&current, &ForecastWindow::empty(), at(16, 0)));
    }

    #[test]
    fn evening_window_includes_sunset() {
        let current = Ok(snapshot("Clear", 80));
        assert!(is_rainbow_possible(&current, &ForecastWindow::empty(), at(18, 0)));
        assert!(!is_rainbow_possible(&current, &ForecastWindow::empty(), at(18, 1)));
    }

    #[test]
    fn clouds_count_as_sun_visibility() {
        let current = Ok(snapshot("Clouds", 80));
        assert!(is_rainbow_possible(&current, &ForecastWindow::empty(), at(6, 30)));
    }
}
