//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Value, json};
use slackqa_core::{CandidateMessage, ChatStore, FileAttachment, UserInfo, extract_links};
use tracing::{debug, info};

use crate::{Result, SlackError};

pub const SLACK_API_URL: &str = "https://slack.com/api";

/// Anything that can post a message into a channel thread.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn post_message(&self, channel: &str, text: &str, thread_ts: Option<&str>) -> Result<()>;
}

/// Reads with the user token, posts with the bot token.
#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    user_token: String,
    bot_token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(user_token: String, bot_token: String) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            user_token,
            bot_token,
            base_url: SLACK_API_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn get(&self, method: &str, token: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = Url::parse_with_params(&format!("{}/{method}", self.base_url), params)
            .map_err(|e| SlackError::Url(e.to_string()))?;
        let body = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        check_ok(method, body)
    }

    async fn post(&self, method: &str, token: &str, payload: &Value) -> Result<Value> {
        let body = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        check_ok(method, body)
    }

    pub async fn conversations_history(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<CandidateMessage>> {
        let body = self
            .get(
                "conversations.history",
                &self.user_token,
                &[("channel", channel.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        let messages = parse_messages(&body["messages"], Some(channel));
        debug!("conversations.history {channel}: {} message(s)", messages.len());
        Ok(messages)
    }

    pub async fn search_messages(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<CandidateMessage>> {
        let body = self
            .get(
                "search.messages",
                &self.user_token,
                &[("query", query.to_string()), ("count", count.to_string())],
            )
            .await?;
        let matches = parse_messages(&body["messages"]["matches"], None);
        debug!("search.messages '{query}': {} match(es)", matches.len());
        Ok(matches)
    }

    pub async fn users_info(&self, user_id: &str) -> Result<UserInfo> {
        let body = self
            .get("users.info", &self.user_token, &[("user", user_id.to_string())])
            .await?;
        Ok(parse_user(user_id, &body["user"]))
    }

    pub async fn chat_post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<()> {
        let mut payload = json!({ "channel": channel, "text": text });
        if let Some(ts) = thread_ts {
            payload["thread_ts"] = json!(ts);
        }
        self.post("chat.postMessage", &self.bot_token, &payload).await?;
        info!("Posted {} char(s) to {channel}", text.chars().count());
        Ok(())
    }
}

/// Turn `{"ok": false, "error": …}` into [`SlackError::Api`].
fn check_ok(method: &str, body: Value) -> Result<Value> {
    if body["ok"].as_bool() == Some(true) {
        return Ok(body);
    }
    Err(SlackError::Api {
        method: method.to_string(),
        error: body["error"].as_str().unwrap_or("unknown_error").to_string(),
    })
}

fn parse_messages(list: &Value, channel: Option<&str>) -> Vec<CandidateMessage> {
    list.as_array()
        .map(|items| items.iter().filter_map(|m| parse_message(m, channel)).collect())
        .unwrap_or_default()
}

/// History items carry no channel, search matches carry `channel.id`.
fn parse_message(value: &Value, channel: Option<&str>) -> Option<CandidateMessage> {
    let ts = value["ts"].as_str()?;
    let text = value["text"].as_str().unwrap_or_default();

    let mut message = CandidateMessage::new(ts, text);
    message.user = value["user"].as_str().map(str::to_string);
    message.channel = value["channel"]["id"]
        .as_str()
        .or(channel)
        .map(str::to_string);
    message.links = extract_links(text);
    message.files = value["files"]
        .as_array()
        .map(|files| {
            files
                .iter()
                .map(|f| FileAttachment {
                    name: f["name"].as_str().unwrap_or("Unknown File").to_string(),
                    filetype: f["filetype"].as_str().unwrap_or("unknown").to_string(),
                    size: f["size"].as_u64().unwrap_or(0),
                })
                .collect()
        })
        .unwrap_or_default();
    Some(message)
}

fn parse_user(user_id: &str, user: &Value) -> UserInfo {
    let name = user["real_name"]
        .as_str()
        .or_else(|| user["name"].as_str())
        .unwrap_or("Unknown User");
    UserInfo {
        id: user_id.to_string(),
        name: name.to_string(),
        display_name: user["profile"]["display_name"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    }
}

#[async_trait]
impl ChatStore for SlackClient {
    async fn history(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<CandidateMessage>> {
        Ok(self.conversations_history(channel_id, limit).await?)
    }

    async fn search(&self, query: &str, count: usize) -> anyhow::Result<Vec<CandidateMessage>> {
        Ok(self.search_messages(query, count).await?)
    }

    async fn user_info(&self, user_id: &str) -> anyhow::Result<UserInfo> {
        Ok(self.users_info(user_id).await?)
    }
}

#[async_trait]
impl MessageSink for SlackClient {
    async fn post_message(&self, channel: &str, text: &str, thread_ts: Option<&str>) -> Result<()> {
        self.chat_post_message(channel, text, thread_ts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_carry_method_and_code() {
        let reply = json!({ "ok": false, "error": "not_allowed_token_type" });
        let err = check_ok("search.messages", reply);
        assert!(matches!(
            err,
            Err(SlackError::Api { ref method, ref error })
                if method == "search.messages" && error == "not_allowed_token_type"
        ));
        assert!(check_ok("x", json!({ "ok": true })).is_ok());
        assert!(check_ok("x", json!({})).is_err());
    }

    #[test]
    fn history_items_inherit_the_requested_channel() {
        let list = json!([
            { "ts": "1700000000.000100", "user": "U1", "text": "see <https://a.example|doc>",
              "files": [{ "name": "plan.pdf", "filetype": "pdf", "size": 2048 }] },
            { "text": "no ts, skipped" }
        ]);
        let messages = parse_messages(&list, Some("C1"));
        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.channel.as_deref(), Some("C1"));
        assert_eq!(message.user.as_deref(), Some("U1"));
        assert_eq!(message.links, vec!["https://a.example"]);
        assert_eq!(message.files[0].size, 2048);
    }

    #[test]
    fn search_matches_carry_their_own_channel() {
        let list = json!([
            { "ts": "1.0", "text": "x", "channel": { "id": "C9", "name": "random" } }
        ]);
        let messages = parse_messages(&list, None);
        assert_eq!(messages[0].channel.as_deref(), Some("C9"));
    }

    #[test]
    fn user_names_fall_back_sensibly() {
        let profile = json!({ "real_name": "Sato", "profile": { "display_name": "sato" } });
        let full = parse_user("U1", &profile);
        assert_eq!(full.name, "Sato");
        assert_eq!(full.display_name, "sato");

        let bare = parse_user("U2", &json!({}));
        assert_eq!(bare, UserInfo::unknown("U2"));
    }
}
