//! In-memory sources for provider tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    AstronautSource, FlightSource, HeadlineSource, LlmBackend, LlmError, MarketData, SourceError,
};

pub struct FixedAstronauts(Option<u32>);

impl FixedAstronauts {
    pub fn new(count: Option<u32>) -> Self {
        Self(count)
    }
}

#[async_trait]
impl AstronautSource for FixedAstronauts {
    async fn people_in_space(&self) -> Result<u32, SourceError> {
        self.0.ok_or(SourceError::Network("connection refused".into()))
    }
}

pub struct FixedFlights(Option<usize>);

impl FixedFlights {
    pub fn new(count: Option<usize>) -> Self {
        Self(count)
    }
}

#[async_trait]
impl FlightSource for FixedFlights {
    async fn aircraft_in_flight(&self) -> Result<usize, SourceError> {
        self.0.ok_or(SourceError::Status(503))
    }
}

/// Volatility closes for symbols starting with `^`, crypto closes otherwise
pub struct FixedMarket {
    volatility: Option<Vec<f64>>,
    crypto: Option<Vec<f64>>,
}

impl FixedMarket {
    pub fn new(volatility: Option<Vec<f64>>, crypto: Option<Vec<f64>>) -> Self {
        Self { volatility, crypto }
    }
}

#[async_trait]
impl MarketData for FixedMarket {
    async fn daily_closes(&self, symbol: &str, _range: &str) -> Result<Vec<f64>, SourceError> {
        let series = if symbol.starts_with('^') {
            &self.volatility
        } else {
            &self.crypto
        };
        series.clone().ok_or(SourceError::Network("timed out".into()))
    }
}

/// Serves a fixed list of titles per feed, in call order
pub struct CannedHeadlines {
    feeds: Vec<Option<Vec<String>>>,
    pub calls: AtomicUsize,
}

impl CannedHeadlines {
    pub fn per_feed(feeds: Vec<Option<Vec<&str>>>) -> Self {
        Self {
            feeds: feeds
                .into_iter()
                .map(|f| f.map(|titles| titles.into_iter().map(String::from).collect()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every feed returns the same titles
    pub fn all(titles: &[&str]) -> Self {
        Self::per_feed(vec![Some(titles.to_vec()); 3])
    }

    /// Every feed fails
    pub fn unreachable() -> Self {
        Self::per_feed(vec![None, None, None])
    }
}

#[async_trait]
impl HeadlineSource for CannedHeadlines {
    async fn headlines(&self, _feed_url: &str, limit: usize) -> Result<Vec<String>, SourceError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.feeds.get(idx).cloned().flatten() {
            Some(titles) => Ok(titles.into_iter().take(limit).collect()),
            None => Err(SourceError::Status(404)),
        }
    }
}

/// Backend that returns one canned outcome and records prompts
pub struct ScriptedBackend {
    outcome: Result<String, u16>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn reply(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            outcome: Err(status),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, _system: &str, user: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(LlmError::Status {
                status: *status,
                body: "unavailable".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
