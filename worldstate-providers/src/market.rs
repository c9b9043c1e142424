//! Market data source
//!
//! Daily closes from Yahoo's v8 chart API. The API is unofficial and changes
//! shape without notice, so every field is optional and validated here.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use worldstate_net::HttpClient;

use crate::SourceError;

/// Provides recent daily closing prices, oldest first
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn daily_closes(&self, symbol: &str, range: &str) -> Result<Vec<f64>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance chart API client
pub struct YahooMarketData {
    client: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl YahooMarketData {
    pub fn new(client: HttpClient, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Build the chart API URL for a symbol and range
    fn chart_url(&self, symbol: &str, range: &str) -> String {
        format!(
            "{}/{}?range={}&interval=1d",
            self.base_url,
            urlencoding::encode(symbol),
            urlencoding::encode(range)
        )
    }
}

/// Pull the finite closes out of a chart response
fn parse_closes(resp: ChartResponse) -> Result<Vec<f64>, SourceError> {
    let result = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) => {
            return Err(SourceError::Parse(format!(
                "{}: {}",
                err.code, err.description
            )))
        }
        (None, None) => return Err(SourceError::MissingField("chart.result")),
    };

    let quote = result
        .into_iter()
        .next()
        .and_then(|data| data.indicators.quote.into_iter().next())
        .ok_or(SourceError::MissingField("indicators.quote"))?;

    let closes: Vec<f64> = quote
        .close
        .into_iter()
        .flatten()
        .filter(|c| c.is_finite())
        .collect();

    if closes.is_empty() {
        return Err(SourceError::Empty);
    }
    Ok(closes)
}

#[async_trait]
impl MarketData for YahooMarketData {
    async fn daily_closes(&self, symbol: &str, range: &str) -> Result<Vec<f64>, SourceError> {
        let url = self.chart_url(symbol, range);
        let resp: ChartResponse = self.client.get_json(&url, self.timeout).await?;
        let closes = parse_closes(resp)?;
        debug!("{} closes for {} over {}", closes.len(), symbol, range);
        Ok(closes)
    }
}
