//! Summary types - the structured output produced per review.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized sentiment label. Raw model strings never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Pos,
    Neg,
    Mixed,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Pos => "pos",
            Sentiment::Neg => "neg",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated summary of a single review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub sentiment: Sentiment,
    /// One-sentence summary, ideally around ten words
    pub tldr: String,
}

impl Summary {
    /// Create a new summary
    pub fn new(sentiment: Sentiment, tldr: impl Into<String>) -> Self {
        Self {
            sentiment,
            tldr: tldr.into(),
        }
    }
}

/// A review as returned by the review source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Steam id of the reviewer
    pub author: String,
    pub text: String,
    pub recommended: bool,
}

/// What gets rendered for one review: either its summary merged with the
/// author fields, or the error that stopped it from being summarised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Summary {
        #[serde(flatten)]
        summary: Summary,
        author: String,
        recommended: bool,
    },
    Error {
        error: String,
        author: String,
    },
}

impl Snapshot {
    /// Merge a summary with the review it was produced from
    pub fn from_summary(summary: Summary, review: &Review) -> Self {
        Snapshot::Summary {
            summary,
            author: review.author.clone(),
            recommended: review.recommended,
        }
    }

    pub fn from_error(error: impl fmt::Display, review: &Review) -> Self {
        Snapshot::Error {
            error: error.to_string(),
            author: review.author.clone(),
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Snapshot::Summary { author, .. } | Snapshot::Error { author, .. } => author,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Snapshot::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review() -> Review {
        Review {
            author: "76561198000000000".to_string(),
            text: "Great".to_string(),
            recommended: true,
        }
    }

    #[test]
    fn summary_snapshot_serializes_flat() {
        let snapshot = Snapshot::from_summary(Summary::new(Sentiment::Pos, "Short and sweet"), &review());
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "sentiment": "pos",
                "tldr": "Short and sweet",
                "author": "76561198000000000",
                "recommended": true
            })
        );
    }

    #[test]
    fn error_snapshot_keeps_author() {
        let snapshot = Snapshot::from_error("LLM request failed: boom", &review());
        assert!(snapshot.is_error());
        assert_eq!(snapshot.author(), "76561198000000000");
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({ "error": "LLM request failed: boom", "author": "76561198000000000" })
        );
    }

    #[test]
    fn cached_summary_reads_back() {
        let summary: Summary =
            serde_json::from_str(r#"{"sentiment":"mixed","tldr":"Fine I guess"}"#).unwrap();
        assert_eq!(summary, Summary::new(Sentiment::Mixed, "Fine I guess"));
    }
}
