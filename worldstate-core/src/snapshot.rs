//! World state snapshot
//!
//! The immutable record of all seven indicators plus the instant it was
//! taken. Serializes to the flat document consumed downstream:
//!
//! ```json
//! {
//!   "p_season": 0.9513,
//!   "p_ascension": 0.7,
//!   ...
//!   "timestamp": "2025-01-01T00:00:00.000000Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use thiserror::Error;

use crate::{round_indicator, Indicator, IndicatorKind};

/// Timestamp layout: ISO-8601, microseconds, literal `Z`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("Indicator {0} was never recorded")]
    Missing(IndicatorKind),
}

/// Complete set of indicators at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "p_season")]
    pub season: f64,
    #[serde(rename = "p_ascension")]
    pub ascension: f64,
    #[serde(rename = "p_entropy")]
    pub entropy: f64,
    #[serde(rename = "p_sentiment")]
    pub sentiment: f64,
    #[serde(rename = "p_cosmic")]
    pub cosmic: f64,
    #[serde(rename = "p_atmosphere")]
    pub atmosphere: f64,
    #[serde(rename = "p_humanity")]
    pub humanity: f64,
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Value for one indicator kind
    pub fn get(&self, kind: IndicatorKind) -> f64 {
        match kind {
            IndicatorKind::Season => self.season,
            IndicatorKind::Ascension => self.ascension,
            IndicatorKind::Entropy => self.entropy,
            IndicatorKind::Sentiment => self.sentiment,
            IndicatorKind::Cosmic => self.cosmic,
            IndicatorKind::Atmosphere => self.atmosphere,
            IndicatorKind::Humanity => self.humanity,
        }
    }

    /// Pretty-printed JSON document (two-space indent)
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Timestamp as it appears in the document
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

/// Collects indicators one by one; fails to build until all seven are present
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    values: HashMap<IndicatorKind, f64>,
}

impl SnapshotBuilder {
    /// Record an indicator; a later reading of the same kind replaces it
    pub fn indicator(mut self, indicator: Indicator) -> Self {
        self.record(indicator);
        self
    }

    pub fn record(&mut self, indicator: Indicator) {
        self.values
            .insert(indicator.kind, round_indicator(indicator.value));
    }

    pub fn build(self, timestamp: DateTime<Utc>) -> Result<Snapshot, SnapshotError> {
        let get = |kind: IndicatorKind| {
            self.values
                .get(&kind)
                .copied()
                .ok_or(SnapshotError::Missing(kind))
        };

        Ok(Snapshot {
            season: get(IndicatorKind::Season)?,
            ascension: get(IndicatorKind::Ascension)?,
            entropy: get(IndicatorKind::Entropy)?,
            sentiment: get(IndicatorKind::Sentiment)?,
            cosmic: get(IndicatorKind::Cosmic)?,
            atmosphere: get(IndicatorKind::Atmosphere)?,
            humanity: get(IndicatorKind::Humanity)?,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_builder() -> SnapshotBuilder {
        IndicatorKind::ALL
            .iter()
            .enumerate()
            .fold(Snapshot::builder(), |b, (i, kind)| {
                b.indicator(Indicator::new(*kind, 0.1 * i as f64 + 0.012345))
            })
    }

    #[test]
    fn test_build_rounds_values() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let snapshot = full_builder().build(ts).unwrap();
        assert_eq!(snapshot.season, 0.0123);
        assert_eq!(snapshot.ascension, 0.1123);
        assert_eq!(snapshot.get(IndicatorKind::Humanity), 0.6123);
    }

    #[test]
    fn test_missing_indicator() {
        let ts = Utc::now();
        let result = Snapshot::builder()
            .indicator(Indicator::new(IndicatorKind::Season, 0.5))
            .build(ts);
        assert_eq!(result, Err(SnapshotError::Missing(IndicatorKind::Ascension)));
    }

    #[test]
    fn test_document_keys_and_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let snapshot = full_builder().build(ts).unwrap();
        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json_pretty().unwrap()).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 8);
        for kind in IndicatorKind::ALL {
            assert!(obj[kind.key()].is_f64(), "missing {}", kind.key());
        }
        assert_eq!(obj["timestamp"], "2025-06-01T08:30:00.000000Z");
    }

    #[test]
    fn test_document_parses_back() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let snapshot = full_builder().build(ts).unwrap();
        let text = snapshot.to_json_pretty().unwrap();
        assert!(text.contains("\n  \"p_season\""));
        let parsed: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
