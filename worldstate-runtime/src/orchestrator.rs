//! Snapshot Orchestrator
//!
//! Runs every indicator provider and assembles one snapshot:
//! - Providers are independent; none reads another's output
//! - Every provider absorbs its own failures, so collection cannot fail
//!   short of a provider set that is missing a kind
//! - The clock is read once; every provider and the timestamp share that instant
//! - Values are rounded before the snapshot is stamped

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use worldstate_core::{Indicator, SharedClock, Snapshot, SnapshotError};
use worldstate_net::HttpClient;
use worldstate_providers::{
    evaluate, AscensionProvider, AstronautSource, AtmosphereProvider, CosmicProvider,
    EntropyProvider, EntropySymbols, FeedHeadlines, FlightSource, HeadlineSource,
    HumanityProvider, IndicatorProvider, MarketData, OpenNotifyAstronauts, OpenSkyFlights,
    SeasonProvider, SentimentProvider, SharedBackend, SourcesConfig, YahooMarketData,
};

use crate::{write_snapshot, OutputError};

/// How providers are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One provider at a time, in registration order
    #[default]
    Sequential,
    /// All providers at once, joined before the snapshot is built
    Concurrent,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// External collaborators for the network-backed providers
pub struct Sources {
    pub astronauts: Arc<dyn AstronautSource>,
    pub flights: Arc<dyn FlightSource>,
    pub market: Arc<dyn MarketData>,
    pub headlines: Arc<dyn HeadlineSource>,
    /// `None` when no LLM credential is configured
    pub backend: Option<SharedBackend>,
    pub config: SourcesConfig,
}

impl Sources {
    /// Live HTTP sources sharing one connection pool
    pub fn http(client: &HttpClient, config: SourcesConfig, backend: Option<SharedBackend>) -> Self {
        Self {
            astronauts: Arc::new(OpenNotifyAstronauts::new(
                client.clone(),
                &config.astronauts_url,
                config.astronauts_timeout(),
            )),
            flights: Arc::new(OpenSkyFlights::new(
                client.clone(),
                &config.flights_url,
                config.flights_timeout(),
            )),
            market: Arc::new(YahooMarketData::new(
                client.clone(),
                &config.market_base_url,
                config.market_timeout(),
            )),
            headlines: Arc::new(FeedHeadlines::new(client.clone(), config.feed_timeout())),
            backend,
            config,
        }
    }
}

/// Orchestrator configuration
pub struct OrchestratorConfig {
    pub clock: SharedClock,
    pub mode: ExecutionMode,
}

/// Runs providers and produces snapshots
pub struct Orchestrator {
    clock: SharedClock,
    mode: ExecutionMode,
    providers: Vec<Box<dyn IndicatorProvider>>,
}

impl Orchestrator {
    /// Orchestrator over an explicit provider set
    pub fn new(config: OrchestratorConfig, providers: Vec<Box<dyn IndicatorProvider>>) -> Self {
        Self {
            clock: config.clock,
            mode: config.mode,
            providers,
        }
    }

    /// The standard seven providers wired to `sources`
    pub fn standard(config: OrchestratorConfig, sources: Sources) -> Self {
        let providers: Vec<Box<dyn IndicatorProvider>> = vec![
            Box::new(SeasonProvider),
            Box::new(AscensionProvider::new(sources.astronauts, sources.flights)),
            Box::new(EntropyProvider::new(
                sources.market,
                EntropySymbols::from(&sources.config),
            )),
            Box::new(SentimentProvider::new(
                sources.headlines,
                sources.backend,
                &sources.config,
            )),
            Box::new(CosmicProvider),
            Box::new(AtmosphereProvider),
            Box::new(HumanityProvider),
        ];

        info!("Initialized {} providers", providers.len());
        Self::new(config, providers)
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Evaluate every provider at `now`
    pub async fn indicators(&self, now: DateTime<Utc>) -> Vec<Indicator> {
        match self.mode {
            ExecutionMode::Sequential => {
                let mut out = Vec::with_capacity(self.providers.len());
                for provider in &self.providers {
                    out.push(evaluate(provider.as_ref(), now).await);
                }
                out
            }
            ExecutionMode::Concurrent => {
                join_all(
                    self.providers
                        .iter()
                        .map(|provider| evaluate(provider.as_ref(), now)),
                )
                .await
            }
        }
    }

    /// Evaluate every provider and assemble the snapshot
    pub async fn collect(&self) -> Result<Snapshot, SnapshotError> {
        let now = self.clock.now();
        let indicators = self.indicators(now).await;

        let mut builder = Snapshot::builder();
        let mut fallbacks = 0;
        for indicator in &indicators {
            debug!(
                "{} = {:.4}{}",
                indicator.kind,
                indicator.value,
                if indicator.fallback { " (fallback)" } else { "" }
            );
            if indicator.fallback {
                fallbacks += 1;
            }
            builder.record(*indicator);
        }

        let snapshot = builder.build(now)?;
        info!(
            "Snapshot complete at {} ({} of {} indicators on fallback)",
            snapshot.timestamp_string(),
            fallbacks,
            indicators.len()
        );
        Ok(snapshot)
    }

    /// Collect a snapshot and overwrite `output` with it
    pub async fn run(&self, output: &Path) -> Result<Snapshot, RunError> {
        let snapshot = self.collect().await?;
        write_snapshot(output, &snapshot)?;
        info!("Snapshot written to {}", output.display());
        Ok(snapshot)
    }
}
