//! In-memory collaborators shared by the integration suites.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use slackqa_core::{CandidateMessage, ChatMessage, ChatStore, LLMProvider, LLMResponse, UserInfo};

type Responder = Box<dyn Fn(&str) -> anyhow::Result<String> + Send + Sync>;

/// Model whose reply is computed from the prompt.
pub struct MockProvider {
    responder: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(responder: impl Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Routes each pipeline prompt to a canned reply.
    pub fn pipeline(split: &str, keywords: &str, answer: &str, quality: &str) -> Self {
        let (split, keywords, answer, quality) = (
            split.to_string(),
            keywords.to_string(),
            answer.to_string(),
            quality.to_string(),
        );
        Self::new(move |prompt| {
            let reply = if prompt.contains("Evaluate the quality") {
                &quality
            } else if prompt.contains("Input question") {
                &split
            } else if prompt.contains("Generate search keywords") {
                &keywords
            } else {
                &answer
            };
            Ok(reply.clone())
        })
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(anyhow::anyhow!("model unavailable")))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    async fn chat(&self, messages: &[ChatMessage], _model: &str) -> anyhow::Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        let content = (self.responder)(&prompt)?;
        Ok(LLMResponse {
            content,
            usage: None,
        })
    }

    fn default_model(&self) -> &'static str {
        "mock"
    }
}

/// Chat store backed by a fixed message list.
#[derive(Default)]
pub struct MockStore {
    pub messages: Vec<CandidateMessage>,
    pub fail: bool,
    pub history_calls: AtomicUsize,
    pub search_queries: Mutex<Vec<String>>,
}

impl MockStore {
    pub fn with_messages(messages: Vec<CandidateMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ChatStore for MockStore {
    async fn history(
        &self,
        _channel_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<CandidateMessage>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("channel_not_found");
        }
        Ok(self.messages.iter().take(limit).cloned().collect())
    }

    async fn search(&self, query: &str, count: usize) -> anyhow::Result<Vec<CandidateMessage>> {
        if let Ok(mut queries) = self.search_queries.lock() {
            queries.push(query.to_string());
        }
        if self.fail {
            anyhow::bail!("not_allowed_token_type");
        }
        Ok(self.messages.iter().take(count).cloned().collect())
    }

    async fn user_info(&self, user_id: &str) -> anyhow::Result<UserInfo> {
        if user_id == "U_MISSING" {
            anyhow::bail!("user_not_found");
        }
        Ok(UserInfo {
            id: user_id.to_string(),
            name: format!("name-{user_id}"),
            display_name: String::new(),
        })
    }
}

pub fn message(ts: &str, text: &str) -> CandidateMessage {
    CandidateMessage::new(ts, text).with_channel("C1")
}
