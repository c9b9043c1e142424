//! Optional TOML configuration file
//!
//! ```toml
//! [http]
//! max_retries = 3
//! backoff_factor = 0.5
//!
//! [llm]
//! model = "gemini-2.5-flash"
//!
//! [sources]
//! flights_timeout_secs = 30
//! feeds = ["http://feeds.bbci.co.uk/news/world/rss.xml"]
//! ```
//!
//! Every table and key is optional; command-line flags win over the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use worldstate_net::{HttpConfig, RetryPolicy};
use worldstate_providers::SourcesConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub http: HttpSection,
    pub llm: LlmSection,
    pub sources: SourcesConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub max_retries: Option<u32>,
    pub backoff_factor: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn http_config(&self) -> HttpConfig {
        let defaults = HttpConfig::default();
        let retry = RetryPolicy::default();
        HttpConfig {
            connect_timeout_secs: self
                .http
                .connect_timeout_secs
                .unwrap_or(defaults.connect_timeout_secs),
            timeout_secs: self.http.timeout_secs.unwrap_or(defaults.timeout_secs),
            user_agent: self.http.user_agent.clone(),
            retry: RetryPolicy {
                max_retries: self.http.max_retries.unwrap_or(retry.max_retries),
                backoff_factor: self.http.backoff_factor.unwrap_or(retry.backoff_factor),
            },
        }
    }
}
