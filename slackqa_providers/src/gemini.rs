use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use slackqa_core::{ChatMessage, LLMProvider, LLMResponse, Role, Usage};
use tracing::{debug, info};

use crate::retry::{RetryPolicy, is_transient, retry_with_backoff};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    retry: RetryPolicy,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            default_model: GEMINI_DEFAULT_MODEL.to_string(),
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

    async fn try_send(&self, model: &str, request: &Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        parse_response(&response)
    }
}

/// System turns become `systemInstruction`; assistant turns use role `model`.
fn build_request(messages: &[ChatMessage]) -> Value {
    let system = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let contents: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "model",
                _ => "user",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    let mut request = json!({ "contents": contents });
    if !system.is_empty() {
        request["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    request
}

fn parse_response(response: &Value) -> anyhow::Result<LLMResponse> {
    let candidate = &response["candidates"][0];
    let content = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    if content.is_empty() {
        let reason = candidate["finishReason"].as_str().unwrap_or("unknown");
        anyhow::bail!("Invalid response format: missing content (finishReason={reason})");
    }

    let usage = response["usageMetadata"].as_object().map(|u| {
        let count = |key: &str| {
            u32::try_from(u.get(key).and_then(Value::as_u64).unwrap_or(0)).unwrap_or(0)
        };
        Usage {
            prompt_tokens: count("promptTokenCount"),
            completion_tokens: count("candidatesTokenCount"),
            total_tokens: count("totalTokenCount"),
        }
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse> {
        let request = build_request(messages);

        info!("Sending request to Gemini API: model={model}");

        let response = retry_with_backoff(
            || self.try_send(model, &request),
            &self.retry,
            is_transient,
        )
        .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Gemini usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
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
    fn system_turns_move_to_instruction() {
        let request = build_request(&[
            ChatMessage::system("be brief"),
            ChatMessage::user("hello"),
            ChatMessage {
                role: Role::Assistant,
                content: "hi".to_string(),
            },
        ]);
        assert_eq!(request["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(request["contents"].as_array().map(Vec::len), Some(2));
        assert_eq!(request["contents"][0]["role"], "user");
        assert_eq!(request["contents"][1]["role"], "model");
    }

    #[test]
    fn no_system_instruction_without_system_turns() {
        let request = build_request(&[ChatMessage::user("hello")]);
        assert!(request.get("systemInstruction").is_none());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn concatenates_parts_and_reads_usage() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "[\"a\"," }, { "text": " \"b\"]" }] } }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 4, "totalTokenCount": 14 }
        });
        let response = parse_response(&body).expect("valid body should parse");
        assert_eq!(response.content, "[\"a\", \"b\"]");
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(14));
    }

    #[test]
    fn blocked_response_is_an_error() {
        let body = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let err = parse_response(&body).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("SAFETY"));
    }
}
