//! Lunar ephemeris
//!
//! Illuminated fraction of the Moon's disk from the low-precision series in
//! Meeus, *Astronomical Algorithms*, ch. 48. Accurate to well under a percent,
//! which is far below indicator rounding.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Julian day of the Unix epoch
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian day of J2000.0
const J2000_JD: f64 = 2_451_545.0;

const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Span of years the series is trusted for
const VALID_YEARS: std::ops::RangeInclusive<i32> = 1000..=3000;

#[derive(Debug, Error, PartialEq)]
pub enum EphemerisError {
    #[error("Instant {0} is outside the supported ephemeris range")]
    OutOfRange(DateTime<Utc>),

    #[error("Ephemeris produced a non-finite value")]
    NonFinite,
}

/// Julian day for a UTC instant
pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

/// Percentage (0-100) of the Moon's disk that is lit at `instant`
pub fn moon_phase_percent(instant: DateTime<Utc>) -> Result<f64, EphemerisError> {
    use chrono::Datelike;

    if !VALID_YEARS.contains(&instant.year()) {
        return Err(EphemerisError::OutOfRange(instant));
    }

    let t = (julian_day(instant) - J2000_JD) / DAYS_PER_CENTURY;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    // Mean elongation of the Moon
    let d = 297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0
        - t4 / 113_065_000.0;
    // Sun's mean anomaly
    let m = 357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0;
    // Moon's mean anomaly
    let mp = 134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
        - t4 / 14_712_000.0;

    let (dr, mr, mpr) = (d.to_radians(), m.to_radians(), mp.to_radians());

    // Phase angle in degrees
    let i = 180.0 - d
        - 6.289 * mpr.sin()
        + 2.100 * mr.sin()
        - 1.274 * (2.0 * dr - mpr).sin()
        - 0.658 * (2.0 * dr).sin()
        - 0.214 * (2.0 * mpr).sin()
        - 0.110 * dr.sin();

    let k = (1.0 + i.to_radians().cos()) / 2.0;
    if !k.is_finite() {
        return Err(EphemerisError::NonFinite);
    }

    Ok((k * 100.0).clamp(0.0, 100.0))
}
