//! Entropy indicator
//!
//! Market fear: the volatility index blended with bitcoin's latest daily
//! move. Each series falls back independently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use worldstate_core::{abs_percent_change, entropy_score, IndicatorKind};

use crate::{IndicatorProvider, MarketData, SourceError, SourcesConfig};

/// Volatility index level assumed when unavailable
pub const DEFAULT_VIX: f64 = 20.0;

/// Bitcoin daily move (percent) assumed when unavailable
pub const DEFAULT_BTC_CHANGE: f64 = 2.0;

/// Returned when the score itself cannot be computed
pub const ENTROPY_FALLBACK: f64 = 0.35;

/// Which tickers to read and over what window
#[derive(Debug, Clone)]
pub struct EntropySymbols {
    pub volatility: String,
    pub volatility_range: String,
    pub crypto: String,
    pub crypto_range: String,
}

impl Default for EntropySymbols {
    fn default() -> Self {
        Self::from(&SourcesConfig::default())
    }
}

impl From<&SourcesConfig> for EntropySymbols {
    fn from(config: &SourcesConfig) -> Self {
        Self {
            volatility: config.volatility_symbol.clone(),
            volatility_range: config.volatility_range.clone(),
            crypto: config.crypto_symbol.clone(),
            crypto_range: config.crypto_range.clone(),
        }
    }
}

pub struct EntropyProvider {
    market: Arc<dyn MarketData>,
    symbols: EntropySymbols,
}

impl EntropyProvider {
    pub fn new(market: Arc<dyn MarketData>, symbols: EntropySymbols) -> Self {
        Self { market, symbols }
    }

    /// Latest volatility index close
    async fn latest_vix(&self) -> Result<f64, SourceError> {
        let closes = self
            .market
            .daily_closes(&self.symbols.volatility, &self.symbols.volatility_range)
            .await?;
        closes.last().copied().ok_or(SourceError::Empty)
    }

    /// Absolute percent move between the two most recent crypto closes
    async fn crypto_change(&self) -> Result<f64, SourceError> {
        let closes = self
            .market
            .daily_closes(&self.symbols.crypto, &self.symbols.crypto_range)
            .await?;

        match closes.as_slice() {
            [.., previous, latest] => abs_percent_change(*previous, *latest).ok_or_else(|| {
                SourceError::Computation(format!("cannot diff {} -> {}", previous, latest))
            }),
            _ => Err(SourceError::Empty),
        }
    }
}

#[async_trait]
impl IndicatorProvider for EntropyProvider {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Entropy
    }

    fn fallback(&self) -> f64 {
        ENTROPY_FALLBACK
    }

    async fn measure(&self, _now: DateTime<Utc>) -> Result<f64, SourceError> {
        let vix = self.latest_vix().await.unwrap_or_else(|e| {
            warn!(
                provider = "entropy",
                step = "volatility",
                class = e.class(),
                "{} unavailable ({}); assuming {}",
                self.symbols.volatility,
                e,
                DEFAULT_VIX
            );
            DEFAULT_VIX
        });

        let btc_change = self.crypto_change().await.unwrap_or_else(|e| {
            warn!(
                provider = "entropy",
                step = "crypto",
                class = e.class(),
                "{} change unavailable ({}); assuming {}%",
                self.symbols.crypto,
                e,
                DEFAULT_BTC_CHANGE
            );
            DEFAULT_BTC_CHANGE
        });

        info!("Entropy: VIX={:.2}, BTC={:.2}%", vix, btc_change);

        Ok(entropy_score(vix, btc_change))
    }
}
