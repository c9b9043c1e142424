//! Sky occupancy sources
//!
//! - Open Notify: people currently in space
//! - OpenSky Network: aircraft state vectors

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use worldstate_net::HttpClient;

use crate::SourceError;

/// Counts people in orbit
#[async_trait]
pub trait AstronautSource: Send + Sync {
    async fn people_in_space(&self) -> Result<u32, SourceError>;
}

/// Counts aircraft currently airborne
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn aircraft_in_flight(&self) -> Result<usize, SourceError>;
}

#[derive(Debug, Deserialize)]
struct AstrosResponse {
    number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StatesResponse {
    states: Option<Vec<serde_json::Value>>,
}

/// `astros.json` reader
pub struct OpenNotifyAstronauts {
    client: HttpClient,
    url: String,
    timeout: Duration,
}

impl OpenNotifyAstronauts {
    pub fn new(client: HttpClient, url: &str, timeout: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl AstronautSource for OpenNotifyAstronauts {
    async fn people_in_space(&self) -> Result<u32, SourceError> {
        let body: AstrosResponse = self.client.get_json(&self.url, self.timeout).await?;
        body.number.ok_or(SourceError::MissingField("number"))
    }
}

/// `states/all` reader
pub struct OpenSkyFlights {
    client: HttpClient,
    url: String,
    timeout: Duration,
}

impl OpenSkyFlights {
    pub fn new(client: HttpClient, url: &str, timeout: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl FlightSource for OpenSkyFlights {
    async fn aircraft_in_flight(&self) -> Result<usize, SourceError> {
        let body: StatesResponse = self.client.get_json(&self.url, self.timeout).await?;
        let count = count_states(body)?;
        debug!("OpenSky reported {} state vectors", count);
        Ok(count)
    }
}

fn count_states(body: StatesResponse) -> Result<usize, SourceError> {
    match body.states {
        Some(states) if !states.is_empty() => Ok(states.len()),
        _ => Err(SourceError::Empty),
    }
}
