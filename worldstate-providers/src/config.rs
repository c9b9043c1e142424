//! External source configuration
//!
//! Every field has a default; a TOML file may override any subset.

use serde::Deserialize;
use std::time::Duration;

/// Where each provider fetches from, and how long it waits
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// People currently in space
    pub astronauts_url: String,
    pub astronauts_timeout_secs: u64,

    /// Live aircraft state vectors
    pub flights_url: String,
    pub flights_timeout_secs: u64,

    /// Chart API root; the symbol is appended
    pub market_base_url: String,
    pub market_timeout_secs: u64,
    pub volatility_symbol: String,
    pub volatility_range: String,
    pub crypto_symbol: String,
    pub crypto_range: String,

    /// News feeds read in order by the sentiment judge
    pub feeds: Vec<String>,
    pub feed_timeout_secs: u64,
    pub headlines_per_feed: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            astronauts_url: "http://api.open-notify.org/astros.json".to_string(),
            astronauts_timeout_secs: 10,
            flights_url: "https://opensky-network.org/api/states/all".to_string(),
            flights_timeout_secs: 20,
            market_base_url: "https://query2.finance.yahoo.com/v8/finance/chart".to_string(),
            market_timeout_secs: 15,
            volatility_symbol: "^VIX".to_string(),
            volatility_range: "5d".to_string(),
            crypto_symbol: "BTC-USD".to_string(),
            crypto_range: "5d".to_string(),
            feeds: vec![
                "http://feeds.bbci.co.uk/news/world/rss.xml".to_string(),
                "https://www.aljazeera.com/xml/rss/all.xml".to_string(),
                "https://www.reutersagency.com/feed/?best-topics=political-general&post_type=best"
                    .to_string(),
            ],
            feed_timeout_secs: 10,
            headlines_per_feed: 3,
        }
    }
}

impl SourcesConfig {
    pub fn astronauts_timeout(&self) -> Duration {
        Duration::from_secs(self.astronauts_timeout_secs)
    }

    pub fn flights_timeout(&self) -> Duration {
        Duration::from_secs(self.flights_timeout_secs)
    }

    pub fn market_timeout(&self) -> Duration {
        Duration::from_secs(self.market_timeout_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourcesConfig::default();
        assert_eq!(config.feeds.len(), 3);
        assert_eq!(config.headlines_per_feed, 3);
        assert_eq!(config.astronauts_timeout(), Duration::from_secs(10));
        assert_eq!(config.volatility_symbol, "^VIX");
    }

    #[test]
    fn test_partial_override() {
        let config: SourcesConfig = toml::from_str(
            r#"
            feeds = ["https://example.org/rss"]
            flights_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.feeds, vec!["https://example.org/rss"]);
        assert_eq!(config.flights_timeout_secs, 5);
        assert_eq!(config.astronauts_url, SourcesConfig::default().astronauts_url);
    }
}
