//! Sentiment indicator
//!
//! An LLM reads the top headlines from a fixed set of news feeds and scores
//! the collective mood from 0.0 (catastrophic) to 1.0 (utopian).
//!
//! Flow:
//! 1. No backend configured (no API key) -> neutral, no network at all
//! 2. Collect up to N titles per feed, in feed order, skipping dead feeds
//! 3. No headlines -> neutral, no inference call
//! 4. One inference call asking for `{"score": <float>}`
//! 5. Parse and clamp; any failure -> neutral

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use worldstate_core::IndicatorKind;

use crate::{HeadlineSource, IndicatorProvider, SharedBackend, SourceError, SourcesConfig};

/// Neutral midpoint used for every failure path
pub const SENTIMENT_FALLBACK: f64 = 0.5;

/// Separator between headlines in the prompt
pub const HEADLINE_SEPARATOR: &str = "; ";

/// Instruction sent ahead of the headlines
const JUDGE_SYSTEM_PROMPT: &str = "You are a global sentiment analyzer. Analyze the collective sentiment of the \
provided news headlines on a scale of 0.0 (Apocalyptic/War/Disaster) to \
1.0 (Utopian/Peace/Progress). Return a JSON object with a single key 'score' \
containing the float value.";

pub struct SentimentProvider {
    headlines: Arc<dyn HeadlineSource>,
    backend: Option<SharedBackend>,
    feeds: Vec<String>,
    per_feed: usize,
}

impl SentimentProvider {
    /// `backend` is `None` when no credential is configured
    pub fn new(
        headlines: Arc<dyn HeadlineSource>,
        backend: Option<SharedBackend>,
        config: &SourcesConfig,
    ) -> Self {
        Self {
            headlines,
            backend,
            feeds: config.feeds.clone(),
            per_feed: config.headlines_per_feed,
        }
    }

    /// Walk the feeds in order; unreachable or malformed feeds are skipped
    async fn collect_headlines(&self) -> Vec<String> {
        let mut collected = Vec::new();

        for feed in &self.feeds {
            match self.headlines.headlines(feed, self.per_feed).await {
                Ok(titles) => {
                    debug!("{} headlines from {}", titles.len(), feed);
                    collected.extend(titles.into_iter().take(self.per_feed));
                }
                Err(e) => {
                    debug!(
                        provider = "sentiment",
                        step = "headlines",
                        class = e.class(),
                        "Skipping feed {}: {}",
                        feed,
                        e
                    );
                }
            }
        }

        collected
    }
}

/// User message carrying the headlines
pub fn build_user_prompt(headlines: &[String]) -> String {
    format!(
        "Here are the news headlines:\n{}",
        headlines.join(HEADLINE_SEPARATOR)
    )
}

/// Read `score` out of the model's JSON reply. A missing key reads as neutral.
pub fn parse_score(reply: &str) -> Result<f64, SourceError> {
    let body = strip_code_fence(reply);
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| SourceError::Parse("reply is not a JSON object".to_string()))?;

    match object.get("score") {
        None | Some(serde_json::Value::Null) => Ok(SENTIMENT_FALLBACK),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| SourceError::Parse(format!("score {} is not a float", n))),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| SourceError::Parse(format!("score {:?}: {}", s, e))),
        Some(other) => Err(SourceError::Parse(format!("score has type {}", other))),
    }
}

/// Some models wrap JSON in a markdown fence even when asked not to
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

#[async_trait]
impl IndicatorProvider for SentimentProvider {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Sentiment
    }

    fn fallback(&self) -> f64 {
        SENTIMENT_FALLBACK
    }

    async fn measure(&self, _now: DateTime<Utc>) -> Result<f64, SourceError> {
        let backend = match &self.backend {
            Some(backend) => backend,
            None => {
                info!("Sentiment: No API Key");
                return Err(SourceError::MissingCredential("llm api key"));
            }
        };

        let headlines = self.collect_headlines().await;
        if headlines.is_empty() {
            info!("Sentiment: No headlines found.");
            return Err(SourceError::Empty);
        }

        info!(
            "Sentiment: judging {} headlines with {}",
            headlines.len(),
            backend.model_name()
        );

        let reply = backend
            .generate(JUDGE_SYSTEM_PROMPT, &build_user_prompt(&headlines))
            .await
            .map_err(|e| {
                warn!(provider = "sentiment", step = "inference", "LLM call failed: {}", e);
                SourceError::from(e)
            })?;

        let score = parse_score(&reply)?;
        info!("Sentiment ({}): {}", backend.model_name(), score);
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate;
    use crate::test_support::{CannedHeadlines, ScriptedBackend};
    use std::sync::atomic::Ordering;

    fn config() -> SourcesConfig {
        SourcesConfig {
            feeds: vec![
                "https://a.example/rss".to_string(),
                "https://b.example/rss".to_string(),
                "https://c.example/rss".to_string(),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_key_makes_no_calls() {
        let headlines = Arc::new(CannedHeadlines::all(&["Peace talks resume"]));
        let provider = SentimentProvider::new(headlines.clone(), None, &config());

        let ind = evaluate(&provider, Utc::now()).await;
        assert_eq!(ind.value, 0.5);
        assert_eq!(headlines.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_headlines_skips_inference() {
        let headlines = Arc::new(CannedHeadlines::unreachable());
        let backend = Arc::new(ScriptedBackend::reply(r#"{"score": 0.9}"#));
        let provider = SentimentProvider::new(headlines.clone(), Some(backend.clone()), &config());

        let ind = evaluate(&provider, Utc::now()).await;
        assert_eq!(ind.value, 0.5);
        assert_eq!(headlines.calls.load(Ordering::SeqCst), 3);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scores_collected_headlines() {
        let headlines = Arc::new(CannedHeadlines::per_feed(vec![
            Some(vec!["A1", "A2", "A3", "A4"]),
            None,
            Some(vec!["C1"]),
        ]));
        let backend = Arc::new(ScriptedBackend::reply(r#"{"score": 0.8123}"#));
        let provider = SentimentProvider::new(headlines.clone(), Some(backend.clone()), &config());

        let ind = evaluate(&provider, Utc::now()).await;
        assert_eq!(ind.value, 0.8123);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts[0], "Here are the news headlines:\nA1; A2; A3; C1");
    }

    #[tokio::test]
    async fn test_model_failure_is_neutral() {
        let headlines = Arc::new(CannedHeadlines::all(&["Storm hits coast"]));
        let backend = Arc::new(ScriptedBackend::status(503));
        let provider = SentimentProvider::new(headlines, Some(backend), &config());

        let ind = evaluate(&provider, Utc::now()).await;
        assert_eq!(ind.value, 0.5);
        assert!(ind.fallback);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_clamped() {
        let headlines = Arc::new(CannedHeadlines::all(&["Everything is wonderful"]));
        let backend = Arc::new(ScriptedBackend::reply(r#"{"score": 7}"#));
        let provider = SentimentProvider::new(headlines, Some(backend), &config());

        assert_eq!(evaluate(&provider, Utc::now()).await.value, 1.0);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(r#"{"score": 0.25}"#).unwrap(), 0.25);
        assert_eq!(parse_score(r#"{"mood": "bleak"}"#).unwrap(), 0.5);
        assert_eq!(parse_score(r#"{"score": "0.6"}"#).unwrap(), 0.6);
        assert_eq!(parse_score("```json\n{\"score\": 0.3}\n```").unwrap(), 0.3);
        assert!(matches!(parse_score("not json"), Err(SourceError::Parse(_))));
        assert!(matches!(parse_score("[0.4]"), Err(SourceError::Parse(_))));
        assert!(matches!(parse_score(r#"{"score": true}"#), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_user_prompt() {
        let prompt = build_user_prompt(&["One".to_string(), "Two".to_string()]);
        assert!(prompt.ends_with("One; Two"));
    }
}
