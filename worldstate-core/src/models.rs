//! Deterministic world models and normalization bands
//!
//! Everything here is a pure function of its inputs. Providers that fetch
//! raw measurements over the network normalize them with the same helpers.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

use crate::clamp01;

/// Length of the modelled year in days
pub const YEAR_DAYS: f64 = 365.0;

/// Phase offset in days shared by the season and CO2 cycles
pub const SEASONAL_OFFSET_DAYS: f64 = 10.0;

// Atmosphere: CO2 ppm trend
pub const CO2_BASE_YEAR: i32 = 2024;
pub const CO2_BASE_PPM: f64 = 422.0;
pub const CO2_PPM_PER_YEAR: f64 = 2.4;
pub const CO2_SEASONAL_AMPLITUDE: f64 = 3.5;
pub const CO2_BAND_MIN: f64 = 415.0;
pub const CO2_BAND_WIDTH: f64 = 35.0;

// Humanity: population trend
pub const POPULATION_BASE: f64 = 8_045_000_000.0;
/// 2023-07-01T00:00:00Z
pub const POPULATION_EPOCH_SECS: i64 = 1_688_169_600;
pub const POPULATION_GROWTH_PER_SEC: f64 = 2.2;
pub const POPULATION_BAND_MIN: f64 = 8_000_000_000.0;
pub const POPULATION_BAND_WIDTH: f64 = 2_000_000_000.0;

// Ascension: concurrent flights
pub const FLIGHTS_BAND_MIN: f64 = 4_000.0;
pub const FLIGHTS_BAND_WIDTH: f64 = 12_000.0;
pub const FLIGHTS_ESTIMATE_MEAN: f64 = 9_000.0;
pub const FLIGHTS_ESTIMATE_AMPLITUDE: f64 = 4_000.0;
/// UTC hour at which the estimate crosses its mean going up
pub const FLIGHTS_ESTIMATE_PHASE_HOUR: f64 = 9.0;

// Entropy: market fear
pub const VIX_FLOOR: f64 = 10.0;
pub const VIX_SPAN: f64 = 50.0;
pub const BTC_CHANGE_SPAN: f64 = 10.0;
pub const VIX_WEIGHT: f64 = 0.7;
pub const BTC_WEIGHT: f64 = 0.3;

/// Position in the yearly cycle, exactly `[0, 1]` by construction
pub fn season_value(now: DateTime<Utc>) -> f64 {
    let day = now.ordinal() as f64;
    ((((day + SEASONAL_OFFSET_DAYS) * 2.0 * PI) / YEAR_DAYS).cos() + 1.0) / 2.0
}

/// Modelled CO2 concentration in ppm: linear trend plus seasonal cosine
pub fn co2_ppm(now: DateTime<Utc>) -> f64 {
    let years = (now.year() - CO2_BASE_YEAR) as f64;
    let trend = years * CO2_PPM_PER_YEAR;

    let day = now.ordinal() as f64;
    let osc = CO2_SEASONAL_AMPLITUDE * (2.0 * PI * (day - SEASONAL_OFFSET_DAYS) / YEAR_DAYS).cos();

    CO2_BASE_PPM + trend + osc
}

pub fn atmosphere_value(now: DateTime<Utc>) -> f64 {
    clamp01((co2_ppm(now) - CO2_BAND_MIN) / CO2_BAND_WIDTH)
}

/// Modelled world population at `now`
pub fn world_population(now: DateTime<Utc>) -> f64 {
    let elapsed_ms = now.timestamp_millis() - POPULATION_EPOCH_SECS * 1000;
    let secs = elapsed_ms as f64 / 1000.0;
    POPULATION_BASE + secs * POPULATION_GROWTH_PER_SEC
}

pub fn humanity_value(now: DateTime<Utc>) -> f64 {
    clamp01((world_population(now) - POPULATION_BAND_MIN) / POPULATION_BAND_WIDTH)
}

/// Sinusoidal guess of concurrent flights by UTC hour, used when live
/// flight data is unavailable
pub fn estimated_flights(now: DateTime<Utc>) -> f64 {
    let hour = now.hour() as f64;
    FLIGHTS_ESTIMATE_MEAN
        + FLIGHTS_ESTIMATE_AMPLITUDE * ((hour - FLIGHTS_ESTIMATE_PHASE_HOUR) * PI / 12.0).sin()
}

/// Map 4,000..16,000 concurrent flights onto `[0, 1]`
pub fn ascension_score(planes: f64) -> f64 {
    clamp01((planes - FLIGHTS_BAND_MIN) / FLIGHTS_BAND_WIDTH)
}

/// Blend volatility index and bitcoin daily move into one fear score
pub fn entropy_score(vix: f64, btc_change_pct: f64) -> f64 {
    let norm_vix = (vix - VIX_FLOOR) / VIX_SPAN;
    let norm_btc = btc_change_pct / BTC_CHANGE_SPAN;
    clamp01(norm_vix * VIX_WEIGHT + norm_btc * BTC_WEIGHT)
}

/// Absolute percent change from `previous` to `latest`
pub fn abs_percent_change(previous: f64, latest: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !latest.is_finite() {
        return None;
    }
    Some(((latest - previous) / previous).abs() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn on_day(year: i32, ordinal: u32, hour: u32) -> DateTime<Utc> {
        let date = NaiveDate::from_yo_opt(year, ordinal).unwrap();
        Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
    }

    #[test]
    fn test_season_is_pure_function_of_date() {
        let morning = on_day(2025, 120, 1);
        let evening = on_day(2025, 120, 23);
        assert_eq!(season_value(morning), season_value(evening));
        assert_eq!(season_value(morning), season_value(morning));
        assert_eq!(season_value(on_day(2023, 120, 5)), season_value(morning));
    }

    #[test]
    fn test_season_range() {
        for day in 1..=366 {
            let v = season_value(on_day(2024, day, 0));
            assert!((0.0..=1.0).contains(&v), "day {} gave {}", day, v);
        }
        // day 355: (355 + 10) / 365 is a full cycle
        assert!((season_value(on_day(2024, 355, 0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_atmosphere_at_base_year_peak() {
        let now = on_day(CO2_BASE_YEAR, 10, 12);
        assert!((co2_ppm(now) - 425.5).abs() < 1e-9);
        assert!((atmosphere_value(now) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_atmosphere_trend() {
        let base = co2_ppm(on_day(2024, 100, 0));
        let later = co2_ppm(on_day(2026, 100, 0));
        assert!((later - base - 2.0 * CO2_PPM_PER_YEAR).abs() < 1e-9);
    }

    #[test]
    fn test_atmosphere_clamps_far_future() {
        assert_eq!(atmosphere_value(on_day(2100, 10, 0)), 1.0);
        assert_eq!(atmosphere_value(on_day(1990, 10, 0)), 0.0);
    }

    #[test]
    fn test_population_at_epoch() {
        let epoch = Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(epoch.timestamp(), POPULATION_EPOCH_SECS);
        assert_eq!(world_population(epoch), POPULATION_BASE);
        assert!((humanity_value(epoch) - 0.0225).abs() < 1e-12);

        let one_day = epoch + chrono::Duration::days(1);
        assert!((world_population(one_day) - POPULATION_BASE - 86_400.0 * 2.2).abs() < 1e-3);
    }

    #[test]
    fn test_humanity_clamps() {
        let far = Utc.with_ymd_and_hms(2200, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(humanity_value(far), 1.0);
    }

    #[test]
    fn test_ascension_band() {
        assert_eq!(ascension_score(4_000.0), 0.0);
        assert_eq!(ascension_score(16_000.0), 1.0);
        assert!((ascension_score(10_000.0) - 0.5).abs() < 1e-12);
        assert_eq!(ascension_score(0.0), 0.0);
        assert_eq!(ascension_score(40_000.0), 1.0);
    }

    #[test]
    fn test_estimated_flights() {
        assert!((estimated_flights(on_day(2024, 1, 9)) - 9_000.0).abs() < 1e-9);
        assert!((estimated_flights(on_day(2024, 1, 15)) - 13_000.0).abs() < 1e-9);
        assert!((estimated_flights(on_day(2024, 1, 3)) - 5_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_score() {
        assert_eq!(entropy_score(10.0, 0.0), 0.0);
        assert!((entropy_score(60.0, 0.0) - 0.7).abs() < 1e-12);
        assert_eq!(entropy_score(60.0, 12.0), 1.0);
        assert_eq!(entropy_score(110.0, 0.0), 1.0);
        // defaults when both sources are down
        assert!((entropy_score(20.0, 2.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_abs_percent_change() {
        assert!((abs_percent_change(100.0, 103.0).unwrap() - 3.0).abs() < 1e-9);
        assert!((abs_percent_change(100.0, 95.0).unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(abs_percent_change(0.0, 10.0), None);
        assert_eq!(abs_percent_change(f64::NAN, 10.0), None);
    }
}
