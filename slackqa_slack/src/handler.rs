use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use slackqa_core::strip_mentions;
use slackqa_search::SearchSystem;
use tracing::{error, info};

use crate::format::{DEFAULT_CHUNK_DELAY, DEFAULT_CHUNK_SIZE, post_in_chunks};
use crate::{MessageSink, Result};

pub const USAGE_TEXT: &str = "検索クエリを入力してください。例: @検索ボット 先月の会議について";
pub const SEARCH_STARTED_TEXT: &str = "検索を開始します...";

/// The parts of an `app_mention` event the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionEvent {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl MentionEvent {
    /// Replies go into the existing thread, or start one under the mention.
    #[must_use]
    pub fn reply_thread(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// Answers a free-text question about a channel.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn answer(&self, query: &str, channel: &str) -> String;
}

#[async_trait]
impl QueryService for SearchSystem {
    async fn answer(&self, query: &str, channel: &str) -> String {
        self.process_query(query, channel).await
    }
}

#[derive(Clone)]
pub struct MentionHandler {
    service: Arc<dyn QueryService>,
    sink: Arc<dyn MessageSink>,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl MentionHandler {
    #[must_use]
    pub const fn new(service: Arc<dyn QueryService>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            service,
            sink,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    #[must_use]
    pub const fn with_chunking(mut self, chunk_size: usize, chunk_delay: Duration) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_delay = chunk_delay;
        self
    }

    /// Handle one mention end to end. Failures are reported into the thread.
    pub async fn handle(&self, event: &MentionEvent) {
        let user = event.user.as_deref().unwrap_or("unknown");
        info!("[{user}] Mention in {}", event.channel);

        if let Err(e) = self.respond(event).await {
            error!("Failed to handle mention in {}: {e}", event.channel);
            let message = format!("検索処理中にエラーが発生しました: {e}");
            if let Err(e) = self
                .sink
                .post_message(&event.channel, &message, Some(event.reply_thread()))
                .await
            {
                error!("Failed to report error to {}: {e}", event.channel);
            }
        }
    }

    async fn respond(&self, event: &MentionEvent) -> Result<()> {
        let thread = Some(event.reply_thread());
        let query = strip_mentions(&event.text);

        if query.is_empty() {
            return self.sink.post_message(&event.channel, USAGE_TEXT, thread).await;
        }

        self.sink
            .post_message(&event.channel, SEARCH_STARTED_TEXT, thread)
            .await?;

        let answer = self.service.answer(&query, &event.channel).await;
        info!("Answered '{query}' with {} char(s)", answer.chars().count());

        post_in_chunks(
            self.sink.as_ref(),
            &event.channel,
            thread,
            &answer,
            self.chunk_size,
            self.chunk_delay,
        )
        .await
    }
}
