//! Normalized indicators
//!
//! An indicator is one real-world signal squeezed into `[0.0, 1.0]`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{INDICATOR_PRECISION, MAX_INDICATOR, MIN_INDICATOR};

/// The seven indicators carried by every snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Position in the yearly cycle
    Season,
    /// Aircraft (and, nominally, people) above the ground
    Ascension,
    /// Market fear
    Entropy,
    /// News sentiment as judged by a language model
    Sentiment,
    /// Moon illumination
    Cosmic,
    /// Atmospheric CO2 trend
    Atmosphere,
    /// World population trend
    Humanity,
}

impl IndicatorKind {
    /// All kinds, in snapshot key order
    pub const ALL: [IndicatorKind; 7] = [
        IndicatorKind::Season,
        IndicatorKind::Ascension,
        IndicatorKind::Entropy,
        IndicatorKind::Sentiment,
        IndicatorKind::Cosmic,
        IndicatorKind::Atmosphere,
        IndicatorKind::Humanity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Season => "season",
            IndicatorKind::Ascension => "ascension",
            IndicatorKind::Entropy => "entropy",
            IndicatorKind::Sentiment => "sentiment",
            IndicatorKind::Cosmic => "cosmic",
            IndicatorKind::Atmosphere => "atmosphere",
            IndicatorKind::Humanity => "humanity",
        }
    }

    /// Key used in the output document
    pub fn key(&self) -> &'static str {
        match self {
            IndicatorKind::Season => "p_season",
            IndicatorKind::Ascension => "p_ascension",
            IndicatorKind::Entropy => "p_entropy",
            IndicatorKind::Sentiment => "p_sentiment",
            IndicatorKind::Cosmic => "p_cosmic",
            IndicatorKind::Atmosphere => "p_atmosphere",
            IndicatorKind::Humanity => "p_humanity",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single normalized reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub value: f64,
    /// True when the provider had to use its fallback constant
    pub fallback: bool,
}

impl Indicator {
    /// Build an indicator, clamping the value into range.
    /// Non-finite values collapse to the lower bound.
    pub fn new(kind: IndicatorKind, value: f64) -> Self {
        Self {
            kind,
            value: clamp01(value),
            fallback: false,
        }
    }

    pub fn fallback(kind: IndicatorKind, value: f64) -> Self {
        Self {
            kind,
            value: clamp01(value),
            fallback: true,
        }
    }

    /// Value rounded for persistence
    pub fn rounded(&self) -> f64 {
        round_indicator(self.value)
    }
}

/// Clamp into `[0.0, 1.0]`
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_INDICATOR;
    }
    value.clamp(MIN_INDICATOR, MAX_INDICATOR)
}

/// Round to the snapshot precision (4 decimal digits)
pub fn round_indicator(value: f64) -> f64 {
    let scale = 10f64.powi(INDICATOR_PRECISION);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.3), 0.0);
        assert_eq!(clamp01(1.7), 1.0);
        assert_eq!(clamp01(0.42), 0.42);
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_round_indicator() {
        assert_eq!(round_indicator(0.123456), 0.1235);
        assert_eq!(round_indicator(0.5), 0.5);
        assert_eq!(round_indicator(0.99999), 1.0);
    }

    #[test]
    fn test_indicator_clamps_on_construction() {
        let ind = Indicator::new(IndicatorKind::Entropy, 3.2);
        assert_eq!(ind.value, 1.0);
        assert!(!ind.fallback);

        let ind = Indicator::fallback(IndicatorKind::Ascension, 0.7);
        assert_eq!(ind.value, 0.7);
        assert!(ind.fallback);
    }

    #[test]
    fn test_keys_are_prefixed() {
        for kind in IndicatorKind::ALL {
            assert_eq!(kind.key(), format!("p_{}", kind.name()));
        }
    }
}
