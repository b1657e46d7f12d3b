//! Answer synthesis with self-evaluation and caching.

mod cache;
mod prompt;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slackqa_core::{AnswerQuality, CandidateMessage, LLMProvider, complete, extract_object};
use tracing::{debug, info, warn};

pub use cache::{AnswerCache, CacheKey};
pub use prompt::{QuestionType, answer_prompt, build_context, fallback_answer, quality_prompt};

/// Returned when there is nothing to answer from.
pub const NO_INFORMATION_ANSWER: &str = "申し訳ありません。関連する情報が見つかりませんでした。";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// Generation attempts per question.
    #[serde(default = "AnswerConfig::default_max_retries")]
    pub max_retries: usize,
    /// Confidence that ends the loop early.
    #[serde(default = "AnswerConfig::default_accept_confidence")]
    pub accept_confidence: f64,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_retries: Self::default_max_retries(),
            accept_confidence: Self::default_accept_confidence(),
        }
    }
}

impl AnswerConfig {
    const fn default_max_retries() -> usize {
        2
    }

    const fn default_accept_confidence() -> f64 {
        0.8
    }
}

pub struct AnswerGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    cache: AnswerCache,
    config: AnswerConfig,
}

impl AnswerGenerator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        config: AnswerConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            cache: AnswerCache::new(),
            config,
        }
    }

    /// Share an existing cache instead of starting empty.
    #[must_use]
    pub fn with_cache(mut self, cache: AnswerCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &AnswerCache {
        &self.cache
    }

    /// Answer `query` from `messages`, newest first.
    ///
    /// Never fails: with no messages the fixed no-information answer is
    /// returned, otherwise the answer is non-empty.
    pub async fn answer(
        &self,
        query: &str,
        messages: &[CandidateMessage],
    ) -> (String, AnswerQuality) {
        let Some(newest) = messages.first() else {
            return (NO_INFORMATION_ANSWER.to_string(), AnswerQuality::default());
        };

        let key = CacheKey::new(query, messages);
        if let Some(hit) = self.cache.get(&key).await {
            info!("Using cached answer");
            return hit;
        }

        let kind = QuestionType::classify(query);
        let context = build_context(messages);
        let prompt = answer_prompt(query, &context, kind);

        let mut best_answer = String::new();
        let mut best_quality = AnswerQuality::default();

        for attempt in 1..=self.config.max_retries {
            let answer = match complete(self.provider.as_ref(), &self.model, &prompt).await {
                Ok(answer) if !answer.is_empty() => answer,
                Ok(_) => {
                    warn!("Answer attempt {attempt} returned empty text");
                    continue;
                }
                Err(e) => {
                    warn!("Answer attempt {attempt} failed: {e}");
                    continue;
                }
            };

            let quality = self.evaluate(&answer, query, kind).await;
            debug!(
                "Answer attempt {attempt}: confidence={:.2}",
                quality.confidence_score
            );

            if best_answer.is_empty() || quality.confidence_score > best_quality.confidence_score {
                best_answer = answer;
                best_quality = quality;
            }
            if quality.confidence_score >= self.config.accept_confidence {
                break;
            }
        }

        if best_answer.is_empty() {
            info!("No generated answer, falling back to the newest message");
            best_answer = fallback_answer(newest);
            best_quality = AnswerQuality::fallback();
        }

        info!(
            "Answer ready: type={kind}, confidence={:.2}",
            best_quality.confidence_score
        );
        self.cache.insert(key, best_answer.clone(), best_quality).await;
        (best_answer, best_quality)
    }

    async fn evaluate(&self, answer: &str, query: &str, kind: QuestionType) -> AnswerQuality {
        let prompt = quality_prompt(answer, query, kind);
        let response = match complete(self.provider.as_ref(), &self.model, &prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Quality evaluation failed: {e}");
                return AnswerQuality::default();
            }
        };
        extract_object(&response).unwrap_or_else(|e| {
            warn!("Quality evaluation unparsable: {e}");
            AnswerQuality::default()
        })
    }
}
