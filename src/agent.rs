//! LLM agent module for review summarisation.
//!
//! The [`Summariser`] owns a [`Generate`] client and enforces the summary
//! contract: a normalized sentiment and a tldr of roughly ten words. Far-off
//! tldrs get one repair request; call and parse failures are retried with
//! exponential backoff.

pub use crate::summary::{Sentiment, Summary};

use crate::config::SummariseConfig;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Word count the tldr is aimed at.
pub const TARGET_WORDS: usize = 10;

const SYSTEM_PROMPT: &str = r#"You summarise Steam game reviews.
Return EXACTLY this JSON wrapped in triple backticks:
```json
{"sentiment":"pos|neg|mixed","tldr":"10-word fluent sentence"}
```
Rules:
- tldr must be a natural sentence of exactly 10 words.
- Count words (tokens separated by spaces), not characters.
- sentiment must be one of: pos, neg, mixed (lowercase).
- Do not include any commentary outside the JSON fences."#;

lazy_static! {
    static ref CODE_FENCE_RE: Regex =
        Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").expect("valid code fence regex");
    static ref BRACES_RE: Regex = Regex::new(r"(?s)\{.*\}").expect("valid braces regex");
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

/// A remote text-generation call: prompt in, raw model text out.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Tuning knobs for [`Summariser::summarise`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummariseOptions {
    /// Extra attempts after the first failed one
    pub retries: u32,
    /// Base delay, doubled for every further retry
    pub backoff: Duration,
    pub accept_min: usize,
    pub accept_max: usize,
    /// Counts outside `[extreme_min, extreme_max]` trigger a repair request
    pub extreme_min: usize,
    pub extreme_max: usize,
}

impl Default for SummariseOptions {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(800),
            accept_min: 8,
            accept_max: 12,
            extreme_min: 6,
            extreme_max: 16,
        }
    }
}

impl From<&SummariseConfig> for SummariseOptions {
    fn from(config: &SummariseConfig) -> Self {
        Self {
            retries: config.retries,
            backoff: Duration::try_from_secs_f64(config.backoff_secs)
                .unwrap_or(SummariseOptions::default().backoff),
            accept_min: config.accept_min,
            accept_max: config.accept_max,
            extreme_min: config.extreme_min,
            extreme_max: config.extreme_max,
        }
    }
}

impl SummariseOptions {
    /// Delay before retry number `attempt + 1`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }

    /// Whether a word count is far enough off target to ask for a rewrite
    pub fn needs_repair(&self, words: usize) -> bool {
        words < self.extreme_min || words > self.extreme_max
    }

    fn repair_instruction(&self) -> String {
        format!(
            "Rewrite the TL;DR as a fluent sentence of about {} words \
             (acceptable range {}–{}). Only return the JSON.",
            TARGET_WORDS, self.accept_min, self.accept_max
        )
    }
}

/// Fields pulled out of one model reply, before any acceptance decision.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ModelReply {
    pub(crate) sentiment: Sentiment,
    pub(crate) tldr: String,
}

/// Summarisation engine around a generation client.
pub struct Summariser<G> {
    client: G,
    options: SummariseOptions,
}

impl<G: Generate> Summariser<G> {
    pub fn new(client: G) -> Self {
        Self::with_options(client, SummariseOptions::default())
    }

    pub fn with_options(client: G, options: SummariseOptions) -> Self {
        Self { client, options }
    }

    /// Summarise one review, retrying failed attempts with backoff.
    ///
    /// Returns the last error once `retries` extra attempts are used up.
    pub async fn summarise(&self, review_text: &str) -> Result<Summary, AgentError> {
        let mut attempt: u32 = 0;
        loop {
            match self.attempt(review_text).await {
                Ok(summary) => return Ok(summary),
                Err(err) if attempt < self.options.retries => {
                    let delay = self.options.backoff_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "summary attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One primary call plus at most one repair call.
    async fn attempt(&self, review_text: &str) -> Result<Summary, AgentError> {
        let reply = self.ask(review_text, None).await?;
        let mut tldr = reply.tldr;
        let mut words = count_words(&tldr);

        if self.options.needs_repair(words) {
            debug!(words, "tldr far from target, asking for a rewrite");
            let instruction = self.options.repair_instruction();
            match self.ask(review_text, Some(&instruction)).await {
                Ok(repaired) => {
                    let repaired_words = count_words(&repaired.tldr);
                    if distance_from_target(repaired_words) < distance_from_target(words) {
                        tldr = repaired.tldr;
                        words = repaired_words;
                    }
                }
                // Repair failures are non-fatal: the original tldr stands.
                Err(err) => debug!(error = %err, "repair request failed, keeping original tldr"),
            }
        }

        debug!(words, sentiment = %reply.sentiment, "summary accepted");
        Ok(Summary {
            sentiment: reply.sentiment,
            tldr,
        })
    }

    async fn ask(&self, review_text: &str, extra: Option<&str>) -> Result<ModelReply, AgentError> {
        let prompt = build_prompt(review_text, extra);
        let raw = self.client.generate(&prompt).await?;
        debug!(raw = %raw.trim(), "model reply");
        parse_reply(&raw)
    }
}

/// Build the full prompt: instructions, optional extra instruction, review.
pub fn build_prompt(review_text: &str, extra: Option<&str>) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    if let Some(extra) = extra.filter(|e| !e.is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(extra);
    }
    prompt.push_str("\n\nReview:\n");
    prompt.push_str(review_text);
    prompt
}

/// Parse a raw model reply into sentiment and tldr.
pub(crate) fn parse_reply(raw: &str) -> Result<ModelReply, AgentError> {
    let json = extract_json(raw)
        .ok_or_else(|| AgentError::ParseError(format!("no JSON object in reply: {}", raw.trim())))?;
    let fields: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| AgentError::ParseError(format!("{}: {}", e, json)))?;

    let tldr = match fields.get("tldr") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };
    let sentiment = normalize_sentiment(fields.get("sentiment").and_then(Value::as_str));

    Ok(ModelReply { sentiment, tldr })
}

/// Find the JSON object in a reply: fenced block first, then first `{` to last `}`.
pub fn extract_json(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if let Some(captures) = CODE_FENCE_RE.captures(raw) {
        return captures.get(1).map(|m| m.as_str().trim());
    }
    BRACES_RE.find(raw).map(|m| m.as_str().trim())
}

/// Map whatever the model called the sentiment onto the three labels.
pub fn normalize_sentiment(raw: Option<&str>) -> Sentiment {
    let token = raw.unwrap_or_default().trim().to_lowercase();
    match token.as_str() {
        "pos" | "positive" | "👍" | "good" => Sentiment::Pos,
        "neg" | "negative" | "👎" | "bad" => Sentiment::Neg,
        _ => Sentiment::Mixed,
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

pub fn count_words(text: &str) -> usize {
    normalize_whitespace(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .count()
}

fn distance_from_target(words: usize) -> usize {
    words.abs_diff(TARGET_WORDS)
}
