//! Common traits for indicator providers

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use worldstate_core::{Indicator, IndicatorKind};
use worldstate_net::NetError;

use crate::LlmError;

/// Why a source could not deliver. Every variant is absorbed by a
/// provider fallback; none of them escapes a provider.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Malformed payload: {0}")]
    Parse(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Source returned no data")]
    Empty,

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Computation error: {0}")]
    Computation(String),
}

impl SourceError {
    /// Short classification used in log fields
    pub fn class(&self) -> &'static str {
        match self {
            SourceError::Network(_) => "network",
            SourceError::Status(_) => "status",
            SourceError::Parse(_) => "parse",
            SourceError::MissingField(_) => "missing_field",
            SourceError::Empty => "empty",
            SourceError::MissingCredential(_) => "missing_credential",
            SourceError::Computation(_) => "computation",
        }
    }
}

impl From<NetError> for SourceError {
    fn from(e: NetError) -> Self {
        match e {
            NetError::Status { status, .. } => SourceError::Status(status),
            NetError::Decode(msg) | NetError::Parse(msg) => SourceError::Parse(msg),
            other => SourceError::Network(other.to_string()),
        }
    }
}

impl From<LlmError> for SourceError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Net(net) => net.into(),
            LlmError::Status { status, .. } => SourceError::Status(status),
            LlmError::EmptyResponse => SourceError::MissingField("candidates[0].content.parts[0].text"),
            LlmError::Config(_) => SourceError::MissingCredential("llm api key"),
            LlmError::Api(msg) => SourceError::Network(msg),
        }
    }
}

/// Common interface for all indicator providers
#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    /// Which indicator this provider produces
    fn kind(&self) -> IndicatorKind;

    /// Literal value used whenever `measure` fails
    fn fallback(&self) -> f64 {
        0.5
    }

    /// Measure the raw normalized value at `now`. May exceed `[0, 1]`;
    /// [`evaluate`] clamps.
    async fn measure(&self, now: DateTime<Utc>) -> Result<f64, SourceError>;
}

/// Run a provider and absorb any failure into its fallback
pub async fn evaluate(provider: &dyn IndicatorProvider, now: DateTime<Utc>) -> Indicator {
    let kind = provider.kind();

    match provider.measure(now).await {
        Ok(value) if value.is_finite() => Indicator::new(kind, value),
        Ok(value) => {
            warn!(
                provider = %kind,
                class = "computation",
                "{} produced non-finite value {}; using fallback {}",
                kind,
                value,
                provider.fallback()
            );
            Indicator::fallback(kind, provider.fallback())
        }
        Err(e) => {
            warn!(
                provider = %kind,
                class = e.class(),
                "{} failed: {}; using fallback {}",
                kind,
                e,
                provider.fallback()
            );
            Indicator::fallback(kind, provider.fallback())
        }
    }
}
