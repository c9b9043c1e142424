//! News headline source

use async_trait::async_trait;
use std::time::Duration;

use worldstate_net::{fetch_feed_titles, HttpClient};

use crate::SourceError;

/// Reads the top headlines of one feed
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn headlines(&self, feed_url: &str, limit: usize) -> Result<Vec<String>, SourceError>;
}

/// RSS/Atom reader over HTTP
pub struct FeedHeadlines {
    client: HttpClient,
    timeout: Duration,
}

impl FeedHeadlines {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl HeadlineSource for FeedHeadlines {
    async fn headlines(&self, feed_url: &str, limit: usize) -> Result<Vec<String>, SourceError> {
        Ok(fetch_feed_titles(&self.client, feed_url, limit, self.timeout).await?)
    }
}
