use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::message::CandidateMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

impl UserInfo {
    /// Placeholder used when a lookup fails.
    #[must_use]
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Unknown User".to_string(),
            display_name: String::new(),
        }
    }
}

/// Read access to the chat workspace.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Most recent messages of a channel, newest first.
    async fn history(&self, channel_id: &str, limit: usize)
    -> anyhow::Result<Vec<CandidateMessage>>;

    /// Workspace-wide search using the platform's query syntax.
    async fn search(&self, query: &str, count: usize) -> anyhow::Result<Vec<CandidateMessage>>;

    async fn user_info(&self, user_id: &str) -> anyhow::Result<UserInfo>;
}
