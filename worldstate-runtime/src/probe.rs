//! Source reachability probe
//!
//! Issues one GET to every external source and reports what came back,
//! without computing or writing a snapshot.

use std::fmt;
use std::time::Duration;

use worldstate_net::HttpClient;
use worldstate_providers::{GeminiConfig, SourcesConfig};

/// Outcome of probing one source
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeStatus {
    /// Response received with this status
    Reachable(u16),
    /// No response; error text
    Unreachable(String),
}

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub name: String,
    /// URL as displayed; never carries credentials
    pub url: String,
    pub status: ProbeStatus,
}

impl ProbeReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, ProbeStatus::Reachable(200))
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_ok() { "✅" } else { "❌" };
        match &self.status {
            ProbeStatus::Reachable(code) => {
                write!(f, "{} {:<12} HTTP {} ({})", mark, self.name, code, self.url)
            }
            ProbeStatus::Unreachable(err) => {
                write!(f, "{} {:<12} {} ({})", mark, self.name, err, self.url)
            }
        }
    }
}

/// Everything a probe will hit, as (name, display url, request url)
pub fn probe_targets(
    config: &SourcesConfig,
    gemini: Option<&GeminiConfig>,
) -> Vec<(String, String, String)> {
    let mut targets = vec![
        (
            "astronauts".to_string(),
            config.astronauts_url.clone(),
            config.astronauts_url.clone(),
        ),
        (
            "flights".to_string(),
            config.flights_url.clone(),
            config.flights_url.clone(),
        ),
    ];

    for symbol in [&config.volatility_symbol, &config.crypto_symbol] {
        let url = format!(
            "{}/{}?range=1d&interval=1d",
            config.market_base_url.trim_end_matches('/'),
            urlencoding::encode(symbol)
        );
        targets.push((format!("market {}", symbol), url.clone(), url));
    }

    for (i, feed) in config.feeds.iter().enumerate() {
        targets.push((format!("feed {}", i + 1), feed.clone(), feed.clone()));
    }

    if let Some(gemini) = gemini {
        let display = format!(
            "{}/models/{}",
            gemini.base_url.trim_end_matches('/'),
            gemini.model
        );
        let request = format!(
            "{}?key={}",
            display,
            urlencoding::encode(&gemini.api_key)
        );
        targets.push(("llm".to_string(), display, request));
    }

    targets
}

/// Probe every source in order
pub async fn probe_sources(
    client: &HttpClient,
    config: &SourcesConfig,
    gemini: Option<&GeminiConfig>,
    timeout: Duration,
) -> Vec<ProbeReport> {
    let mut reports = Vec::new();

    for (name, display, request) in probe_targets(config, gemini) {
        let status = match client.send(|c| c.get(&request).timeout(timeout)).await {
            Ok(resp) => ProbeStatus::Reachable(resp.status().as_u16()),
            Err(e) => ProbeStatus::Unreachable(e.to_string()),
        };
        reports.push(ProbeReport {
            name,
            url: display,
            status,
        });
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldstate_net::{create_client, HttpConfig, RetryPolicy};

    #[test]
    fn test_targets_hide_key() {
        let gemini = GeminiConfig::new("secret-key", "gemini-2.5-flash");
        let targets = probe_targets(&SourcesConfig::default(), Some(&gemini));

        // 2 sky + 2 market + 3 feeds + llm
        assert_eq!(targets.len(), 8);
        let (name, display, request) = targets.last().unwrap();
        assert_eq!(name, "llm");
        assert!(!display.contains("secret-key"));
        assert!(request.ends_with("?key=secret-key"));
    }

    #[test]
    fn test_targets_without_llm() {
        let targets = probe_targets(&SourcesConfig::default(), None);
        assert_eq!(targets.len(), 7);
        assert!(targets[2].1.contains("%5EVIX"));
    }

    #[tokio::test]
    async fn test_unreachable_source() {
        let client = create_client(&HttpConfig {
            retry: RetryPolicy::none(),
            ..Default::default()
        })
        .unwrap();
        let config = SourcesConfig {
            astronauts_url: "http://127.0.0.1:1/astros.json".to_string(),
            flights_url: "http://127.0.0.1:1/states".to_string(),
            market_base_url: "http://127.0.0.1:1/chart".to_string(),
            feeds: vec![],
            ..Default::default()
        };

        let reports = probe_sources(&client, &config, None, Duration::from_secs(2)).await;
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| !r.is_ok()));
        assert!(matches!(reports[0].status, ProbeStatus::Unreachable(_)));
    }
}
