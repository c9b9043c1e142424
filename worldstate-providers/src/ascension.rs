//! Ascension indicator
//!
//! How crowded the sky is. Two counts are fetched, each with its own
//! fallback:
//! - People in space (default 10). Logged only, never scored.
//! - Aircraft in flight. When unavailable, estimated from the UTC hour.
//!
//! Score: aircraft mapped from 4,000..16,000 onto `[0, 1]`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use worldstate_core::{ascension_score, estimated_flights, IndicatorKind};

use crate::{AstronautSource, FlightSource, IndicatorProvider, SourceError};

/// Assumed head count in orbit when the roster can't be fetched
pub const DEFAULT_ASTRONAUTS: u32 = 10;

/// Returned when the score itself cannot be computed
pub const ASCENSION_FALLBACK: f64 = 0.7;

pub struct AscensionProvider {
    astronauts: Arc<dyn AstronautSource>,
    flights: Arc<dyn FlightSource>,
}

impl AscensionProvider {
    pub fn new(astronauts: Arc<dyn AstronautSource>, flights: Arc<dyn FlightSource>) -> Self {
        Self {
            astronauts,
            flights,
        }
    }

    async fn astronaut_count(&self) -> u32 {
        match self.astronauts.people_in_space().await {
            Ok(n) => n,
            Err(e) => {
                warn!(
                    provider = "ascension",
                    step = "astronauts",
                    class = e.class(),
                    "Astronaut count unavailable ({}); assuming {}",
                    e,
                    DEFAULT_ASTRONAUTS
                );
                DEFAULT_ASTRONAUTS
            }
        }
    }

    async fn plane_count(&self, now: DateTime<Utc>) -> f64 {
        match self.flights.aircraft_in_flight().await {
            Ok(n) => n as f64,
            Err(e) => {
                let estimate = estimated_flights(now);
                warn!(
                    provider = "ascension",
                    step = "flights",
                    class = e.class(),
                    "Flight count unavailable ({}); estimating {:.0}",
                    e,
                    estimate
                );
                estimate
            }
        }
    }
}

#[async_trait]
impl IndicatorProvider for AscensionProvider {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ascension
    }

    fn fallback(&self) -> f64 {
        ASCENSION_FALLBACK
    }

    async fn measure(&self, now: DateTime<Utc>) -> Result<f64, SourceError> {
        let astros = self.astronaut_count().await;
        let planes = self.plane_count(now).await;

        info!("Ascension: planes={:.0}, astros={}", planes, astros);

        if !planes.is_finite() {
            return Err(SourceError::Computation(format!(
                "plane count {} is not finite",
                planes
            )));
        }

        Ok(ascension_score(planes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate;
    use crate::test_support::{FixedAstronauts, FixedFlights};
    use chrono::TimeZone;

    fn provider(astros: Option<u32>, planes: Option<usize>) -> AscensionProvider {
        AscensionProvider::new(
            Arc::new(FixedAstronauts::new(astros)),
            Arc::new(FixedFlights::new(planes)),
        )
    }

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_band_edges() {
        let now = at_hour(12);
        assert_eq!(evaluate(&provider(Some(7), Some(4_000)), now).await.value, 0.0);
        assert_eq!(evaluate(&provider(Some(7), Some(16_000)), now).await.value, 1.0);
        let mid = evaluate(&provider(Some(7), Some(10_000)), now).await.value;
        assert!((mid - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_astronauts_do_not_move_score() {
        let now = at_hour(12);
        let few = evaluate(&provider(Some(3), Some(11_000)), now).await;
        let many = evaluate(&provider(Some(300), Some(11_000)), now).await;
        let missing = evaluate(&provider(None, Some(11_000)), now).await;
        assert_eq!(few.value, many.value);
        assert_eq!(few.value, missing.value);
    }

    #[tokio::test]
    async fn test_flights_unavailable_uses_hourly_estimate() {
        // 15:00 UTC peaks at 13,000 flights -> (13000 - 4000) / 12000
        let ind = evaluate(&provider(None, None), at_hour(15)).await;
        assert!((ind.value - 0.75).abs() < 1e-9);
        assert!(!ind.fallback);

        // 03:00 UTC troughs at 5,000 flights
        let ind = evaluate(&provider(None, None), at_hour(3)).await;
        assert!((ind.value - 1.0 / 12.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_in_range_for_every_hour() {
        for hour in 0..24 {
            for planes in [None, Some(0), Some(1), Some(9_000), Some(50_000)] {
                let value = evaluate(&provider(None, planes), at_hour(hour)).await.value;
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_outer_fallback() {
        assert_eq!(provider(None, None).fallback(), 0.7);
    }
}
