//! Repeated retrieval with progressively relaxed keyword strategies.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use slackqa_core::{CandidateMessage, SearchConstraints};
use tracing::{debug, info};

use crate::keywords::KeywordSource;
use crate::retrieval::MessageRetriever;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Upper bound on retrieval attempts.
    #[serde(default = "RetryConfig::default_max_retries")]
    pub max_retries: usize,
    /// Accumulated unique results that end the loop early.
    #[serde(default = "RetryConfig::default_min_results")]
    pub min_results: usize,
    /// Acceptance threshold per attempt, handed to the keyword source; the
    /// last entry covers later attempts. Retrieval filtering does not use it.
    #[serde(default = "RetryConfig::default_thresholds")]
    pub thresholds: Vec<f64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: Self::default_max_retries(),
            min_results: Self::default_min_results(),
            thresholds: Self::default_thresholds(),
        }
    }
}

impl RetryConfig {
    const fn default_max_retries() -> usize {
        3
    }

    const fn default_min_results() -> usize {
        3
    }

    fn default_thresholds() -> Vec<f64> {
        vec![0.3, 0.2, 0.1]
    }
}

/// What a single attempt knows about its position in the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptContext {
    pub index: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NoKeywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting(usize),
    Success,
    Exhausted,
    Aborted(AbortReason),
}

impl RetryState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Attempting(_))
    }
}

#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub messages: Vec<CandidateMessage>,
    pub attempts: usize,
    pub state: RetryState,
}

#[derive(Debug, Clone)]
pub struct RetryStrategy {
    config: RetryConfig,
    min_relevance: f64,
}

impl RetryStrategy {
    /// `min_relevance` is the retrieval filter for every attempt; it also
    /// stands in for an empty threshold schedule.
    #[must_use]
    pub const fn new(config: RetryConfig, min_relevance: f64) -> Self {
        Self {
            config,
            min_relevance,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    #[must_use]
    pub const fn min_relevance(&self) -> f64 {
        self.min_relevance
    }

    #[must_use]
    pub fn context(&self, index: usize) -> AttemptContext {
        let threshold = self
            .config
            .thresholds
            .get(index)
            .or_else(|| self.config.thresholds.last())
            .copied()
            .unwrap_or(self.min_relevance);
        AttemptContext { index, threshold }
    }

    #[must_use]
    pub const fn initial_state(&self) -> RetryState {
        if self.config.max_retries == 0 {
            RetryState::Exhausted
        } else {
            RetryState::Attempting(0)
        }
    }

    /// State after attempt `index` finished with `accumulated` unique results.
    #[must_use]
    pub const fn transition(&self, index: usize, accumulated: usize) -> RetryState {
        if accumulated >= self.config.min_results {
            RetryState::Success
        } else if index + 1 >= self.config.max_retries {
            RetryState::Exhausted
        } else {
            RetryState::Attempting(index + 1)
        }
    }

    pub async fn execute(
        &self,
        keywords: &dyn KeywordSource,
        retriever: &dyn MessageRetriever,
        channel_id: &str,
        query: &str,
        constraints: &SearchConstraints,
    ) -> RetryOutcome {
        let mut messages = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut attempts = 0;
        let mut state = self.initial_state();

        while let RetryState::Attempting(index) = state {
            let ctx = self.context(index);
            attempts = index + 1;
            info!(
                "Retrieval attempt {attempts}/{} (threshold={:.2}, min_relevance={:.2})",
                self.config.max_retries, ctx.threshold, self.min_relevance
            );

            let terms = keywords.generate(query, constraints, ctx).await;
            if terms.is_empty() {
                info!("Keyword generation produced nothing, aborting retrieval");
                state = RetryState::Aborted(AbortReason::NoKeywords);
                break;
            }

            let results = retriever
                .retrieve(channel_id, &terms, query, self.min_relevance)
                .await;

            let before = messages.len();
            for result in results {
                let key = result.message.text.trim().to_string();
                if !key.is_empty() && seen.insert(key) {
                    messages.push(result.into_message());
                }
            }
            debug!(
                "Attempt {attempts}: {} new, {} accumulated",
                messages.len() - before,
                messages.len()
            );

            state = self.transition(index, messages.len());
        }

        info!(
            "Retrieval finished after {attempts} attempt(s) with {} message(s): {state:?}",
            messages.len()
        );
        RetryOutcome {
            messages,
            attempts,
            state,
        }
    }
}
