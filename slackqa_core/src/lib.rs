#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod date_range;
pub mod markup;
pub mod message;
pub mod parse;
pub mod quality;
pub mod store;
pub mod term;

pub use date_range::{DateRange, DateRangeExtractor};
pub use markup::{clean_slack_message, extract_links, strip_mentions};
pub use message::{
    CandidateMessage, FileAttachment, SearchResult, format_file_attachments, format_file_size,
};
pub use parse::{ParseError, extract_array, extract_object};
pub use quality::AnswerQuality;
pub use store::{ChatStore, UserInfo};
pub use term::{SearchConstraints, SearchModifier, SearchTerm};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse>;
    fn default_model(&self) -> &str;
}

/// Send a single-turn prompt and return the trimmed completion text.
///
/// The model gives no structured-output guarantee; callers parse the text
/// with [`extract_array`] / [`extract_object`].
pub async fn complete(
    provider: &dyn LLMProvider,
    model: &str,
    prompt: &str,
) -> anyhow::Result<String> {
    let response = provider.chat(&[ChatMessage::user(prompt)], model).await?;
    Ok(response.content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl LLMProvider for Echo {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _model: &str,
        ) -> anyhow::Result<LLMResponse> {
            let content = messages
                .iter()
                .map(|m| format!("  {}  ", m.content))
                .collect::<String>();
            Ok(LLMResponse {
                content,
                usage: None,
            })
        }

        fn default_model(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn complete_trims_response() {
        let text = complete(&Echo, "echo", "hello").await.expect("echo never fails");
        assert_eq!(text, "hello");
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("x")).unwrap_or_default();
        assert!(json.contains("\"system\""));
    }
}
