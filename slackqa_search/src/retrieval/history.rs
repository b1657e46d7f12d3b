use std::sync::Arc;

use async_trait::async_trait;
use slackqa_core::{ChatStore, SearchResult, SearchTerm};
use tracing::{debug, info, warn};

use super::MessageRetriever;
use super::scoring::{find_keyword_matches, rank_and_filter, score_all};

/// Fetches recent channel history and scores it locally.
pub struct HistoryRetriever {
    store: Arc<dyn ChatStore>,
    limit: usize,
}

impl HistoryRetriever {
    pub fn new(store: Arc<dyn ChatStore>, limit: usize) -> Self {
        Self { store, limit }
    }
}

#[async_trait]
impl MessageRetriever for HistoryRetriever {
    async fn retrieve(
        &self,
        channel_id: &str,
        terms: &[SearchTerm],
        query: &str,
        min_relevance: f64,
    ) -> Vec<SearchResult> {
        let messages = match self.store.history(channel_id, self.limit).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Failed to fetch history for {channel_id}: {e}");
                return Vec::new();
            }
        };
        let fetched = messages.len();

        let mut matches = find_keyword_matches(messages, terms);
        let matched = matches.len();
        if matches.is_empty() {
            info!("History: {fetched} fetched, no keyword matches");
            return matches;
        }

        let scoring_query = if query.trim().is_empty() {
            terms.first().map(SearchTerm::text).unwrap_or_default()
        } else {
            query.to_string()
        };
        score_all(&mut matches, &scoring_query);

        let results = rank_and_filter(matches, min_relevance);
        info!(
            "History: {fetched} fetched, {matched} matched, {} kept",
            results.len()
        );
        for (i, result) in results.iter().enumerate() {
            let preview: String = result.message.text.chars().take(100).collect();
            debug!(
                "  {}. score={:.2} keywords={:?} {preview}",
                i + 1,
                result.relevance_score(),
                result.matched_keywords()
            );
        }
        results
    }
}
