//! Worldstate Core - Indicator model and deterministic world models
//!
//! This crate provides the foundational primitives:
//! - Normalized indicators and the snapshot that carries all seven of them
//! - An injectable clock so every model can be evaluated at a fixed instant
//! - Pure trend models (season, atmosphere, humanity) and normalization math
//! - A lunar ephemeris for the moon's illuminated fraction

pub mod clock;
pub mod ephemeris;
pub mod indicator;
pub mod models;
pub mod snapshot;

pub use clock::*;
pub use ephemeris::*;
pub use indicator::*;
pub use models::*;
pub use snapshot::*;

/// Lower bound of every indicator
pub const MIN_INDICATOR: f64 = 0.0;

/// Upper bound of every indicator
pub const MAX_INDICATOR: f64 = 1.0;

/// Decimal digits kept when an indicator is written to a snapshot
pub const INDICATOR_PRECISION: i32 = 4;
