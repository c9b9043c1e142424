//! Providers backed purely by deterministic models
//!
//! - **Season**: yearly cosine
//! - **Cosmic**: lunar illumination
//! - **Atmosphere**: CO2 trend
//! - **Humanity**: population trend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use worldstate_core::{
    atmosphere_value, co2_ppm, humanity_value, moon_phase_percent, season_value,
    world_population, IndicatorKind,
};

use crate::{IndicatorProvider, SourceError};

/// Returned when the ephemeris cannot be evaluated
pub const COSMIC_FALLBACK: f64 = 0.5;

pub struct SeasonProvider;

#[async_trait]
impl IndicatorProvider for SeasonProvider {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Season
    }

    async fn measure(&self, now: DateTime<Utc>) -> Result<f64, SourceError> {
        Ok(season_value(now))
    }
}

pub struct CosmicProvider;

#[async_trait]
impl IndicatorProvider for CosmicProvider {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Cosmic
    }

    fn fallback(&self) -> f64 {
        COSMIC_FALLBACK
    }

    async fn measure(&self, now: DateTime<Utc>) -> Result<f64, SourceError> {
        let phase = moon_phase_percent(now).map_err(|e| SourceError::Computation(e.to_string()))?;
        info!("Cosmic: moon {:.1}% illuminated", phase);
        Ok(phase / 100.0)
    }
}

pub struct AtmosphereProvider;

#[async_trait]
impl IndicatorProvider for AtmosphereProvider {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Atmosphere
    }

    async fn measure(&self, now: DateTime<Utc>) -> Result<f64, SourceError> {
        info!("Atmosphere: CO2 {:.2} ppm", co2_ppm(now));
        Ok(atmosphere_value(now))
    }
}

pub struct HumanityProvider;

#[async_trait]
impl IndicatorProvider for HumanityProvider {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Humanity
    }

    async fn measure(&self, now: DateTime<Utc>) -> Result<f64, SourceError> {
        info!("Humanity: population {:.0}", world_population(now));
        Ok(humanity_value(now))
    }
}
