#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steamsnap::agent::{AgentError, Generate};
use tokio::time::Instant;

/// Generation client that plays back canned replies and records prompts.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    replies: Arc<Mutex<VecDeque<Result<String, AgentError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    called_at: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, AgentError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            prompts: Arc::default(),
            called_at: Arc::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Gap between each call and the one before it
    pub fn gaps(&self) -> Vec<Duration> {
        let called_at = self.called_at.lock().unwrap();
        called_at.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }
}

#[async_trait]
impl Generate for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        self.called_at.lock().unwrap().push(Instant::now());
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::RequestFailed("script exhausted".to_string())))
    }
}

/// A well-formed fenced reply
pub fn reply(sentiment: &str, tldr: &str) -> Result<String, AgentError> {
    let body = serde_json::json!({ "sentiment": sentiment, "tldr": tldr });
    Ok(format!("```json\n{}\n```", body))
}

pub fn fail(message: &str) -> Result<String, AgentError> {
    Err(AgentError::RequestFailed(message.to_string()))
}

pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}
