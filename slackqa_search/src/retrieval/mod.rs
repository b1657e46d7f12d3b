//! Candidate retrieval from the chat store.

mod history;
pub mod scoring;
mod search_api;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slackqa_core::{ChatStore, SearchResult, SearchTerm};

pub use history::HistoryRetriever;
pub use search_api::SearchApiRetriever;

#[async_trait]
pub trait MessageRetriever: Send + Sync {
    /// Matched messages in ranking order. Store failures yield an empty list.
    async fn retrieve(
        &self,
        channel_id: &str,
        terms: &[SearchTerm],
        query: &str,
        min_relevance: f64,
    ) -> Vec<SearchResult>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Channel history with local scoring.
    #[default]
    History,
    /// Workspace search API filtered to the channel.
    SearchApi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub strategy: RetrievalStrategy,
    /// Messages fetched per history call.
    #[serde(default = "RetrievalConfig::default_history_limit")]
    pub history_limit: usize,
    /// Matches requested per search call.
    #[serde(default = "RetrievalConfig::default_max_search_results")]
    pub max_search_results: usize,
    #[serde(default = "RetrievalConfig::default_min_relevance_score")]
    pub min_relevance_score: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: RetrievalStrategy::default(),
            history_limit: Self::default_history_limit(),
            max_search_results: Self::default_max_search_results(),
            min_relevance_score: Self::default_min_relevance_score(),
        }
    }
}

impl RetrievalConfig {
    const fn default_history_limit() -> usize {
        1000
    }

    const fn default_max_search_results() -> usize {
        100
    }

    const fn default_min_relevance_score() -> f64 {
        0.3
    }
}

#[must_use]
pub fn build_retriever(
    config: &RetrievalConfig,
    store: Arc<dyn ChatStore>,
) -> Arc<dyn MessageRetriever> {
    match config.strategy {
        RetrievalStrategy::History => Arc::new(HistoryRetriever::new(store, config.history_limit)),
        RetrievalStrategy::SearchApi => {
            Arc::new(SearchApiRetriever::new(store, config.max_search_results))
        }
    }
}
