use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use slackqa_core::{ChatMessage, LLMProvider, LLMResponse, Usage};
use tracing::info;

use crate::retry::{RetryPolicy, is_transient, retry_with_backoff};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Any `chat/completions` endpoint speaking the OpenAI wire format.
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    retry: RetryPolicy,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAiCompatibleProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            default_model: OPENAI_DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_default_model(mut self, model: String) -> Self {
        self.default_model = model;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        parse_response(&response)
    }
}

fn parse_response(response: &Value) -> anyhow::Result<LLMResponse> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
        .to_string();

    let usage = response["usage"].as_object().map(|u| {
        let count = |key: &str| {
            u32::try_from(u.get(key).and_then(Value::as_u64).unwrap_or(0)).unwrap_or(0)
        };
        Usage {
            prompt_tokens: count("prompt_tokens"),
            completion_tokens: count("completion_tokens"),
            total_tokens: count("total_tokens"),
        }
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAiCompatibleProvider {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse> {
        let request = json!({
            "model": model,
            "messages": messages,
        });

        info!("Sending request to {}: model={model}", self.base_url);

        let response =
            retry_with_backoff(|| self.try_send(&request), &self.retry, is_transient).await?;

        info!("Received chat completion");
        Ok(response)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn reads_content_and_usage() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "answer" } }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
        });
        let response = parse_response(&body).expect("valid body should parse");
        assert_eq!(response.content, "answer");
        assert_eq!(response.usage.map(|u| u.prompt_tokens), Some(3));
    }

    #[test]
    fn missing_content_is_an_error() {
        assert!(parse_response(&json!({ "choices": [] })).is_err());
    }
}
