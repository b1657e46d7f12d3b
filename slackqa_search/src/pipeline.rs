//! End-to-end query processing.

use std::sync::Arc;
use std::time::Instant;

use slackqa_core::{ChatStore, DateRangeExtractor, LLMProvider, SearchConstraints};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::answer::{AnswerCache, AnswerConfig, AnswerGenerator};
use crate::keywords::{KeywordConfig, KeywordGenerator, KeywordSource};
use crate::retrieval::{MessageRetriever, RetrievalConfig, build_retriever};
use crate::retry::{RetryConfig, RetryStrategy};
use crate::splitter::QuestionSplitter;

/// Answer used for a sub-question that retrieved nothing.
pub const NO_RESULTS_ANSWER: &str = "関連する情報が見つかりませんでした。";

/// All tunables of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub retrieval: RetrievalConfig,
    pub retry: RetryConfig,
    pub keywords: KeywordConfig,
    pub answer: AnswerConfig,
}

pub struct SearchSystem {
    splitter: QuestionSplitter,
    keywords: Arc<dyn KeywordSource>,
    retriever: Arc<dyn MessageRetriever>,
    retry: RetryStrategy,
    answers: AnswerGenerator,
    dates: DateRangeExtractor,
}

impl SearchSystem {
    /// Build the default pipeline on top of a model and a chat store.
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        model: &str,
        store: Arc<dyn ChatStore>,
        config: PipelineConfig,
    ) -> Self {
        let retriever = build_retriever(&config.retrieval, store);
        let keywords: Arc<dyn KeywordSource> =
            Arc::new(KeywordGenerator::new(provider.clone(), model, config.keywords));
        Self {
            splitter: QuestionSplitter::new(provider.clone(), model),
            keywords,
            retriever,
            retry: RetryStrategy::new(config.retry, config.retrieval.min_relevance_score),
            answers: AnswerGenerator::new(provider, model, config.answer),
            dates: DateRangeExtractor::new(),
        }
    }

    /// Assemble a pipeline from explicit stages.
    pub fn from_parts(
        splitter: QuestionSplitter,
        keywords: Arc<dyn KeywordSource>,
        retriever: Arc<dyn MessageRetriever>,
        retry: RetryStrategy,
        answers: AnswerGenerator,
    ) -> Self {
        Self {
            splitter,
            keywords,
            retriever,
            retry,
            answers,
            dates: DateRangeExtractor::new(),
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &AnswerCache {
        self.answers.cache()
    }

    pub async fn process_query(&self, query: &str, channel_id: &str) -> String {
        self.process_query_from(query, channel_id, None).await
    }

    /// Like [`Self::process_query`], restricted to messages by `user_id`
    /// where the retriever supports it.
    pub async fn process_query_from(
        &self,
        query: &str,
        channel_id: &str,
        user_id: Option<&str>,
    ) -> String {
        let request_id = Uuid::now_v7();
        let span = info_span!("process_query", %request_id, channel = channel_id);
        self.run(query, channel_id, user_id).instrument(span).await
    }

    async fn run(&self, query: &str, channel_id: &str, user_id: Option<&str>) -> String {
        let started = Instant::now();
        info!("Processing query: {query}");

        let questions = self.splitter.split(query).await;
        let mut answers = Vec::with_capacity(questions.len());

        for question in &questions {
            info!("Processing question: {question}");
            let range = self.dates.extract(question);
            if let Some(range) = range {
                let (start, end) = range.to_iso();
                info!("Date range: {start} to {end}");
            }
            let constraints = SearchConstraints {
                start_date: range.map(|r| r.start),
                end_date: range.map(|r| r.end),
                user_id: user_id.map(str::to_string),
            };

            let outcome = self
                .retry
                .execute(
                    self.keywords.as_ref(),
                    self.retriever.as_ref(),
                    channel_id,
                    question,
                    &constraints,
                )
                .await;

            let answer = if outcome.messages.is_empty() {
                NO_RESULTS_ANSWER.to_string()
            } else {
                self.answers.answer(question, &outcome.messages).await.0
            };
            answers.push((question.as_str(), answer));
        }

        let answer = combine(answers);
        info!("Query finished in {:.2}s", started.elapsed().as_secs_f64());
        answer
    }
}

fn combine(mut answers: Vec<(&str, String)>) -> String {
    if answers.len() == 1 {
        return answers.pop().map(|(_, a)| a).unwrap_or_default();
    }
    let body = answers
        .iter()
        .enumerate()
        .map(|(i, (q, a))| format!("質問{}: {q}\n{a}", i + 1))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("複数の質問への回答:\n\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_answer_is_returned_as_is() {
        assert_eq!(combine(vec![("q", "a".to_string())]), "a");
    }

    #[test]
    fn multiple_answers_are_numbered() {
        let combined = combine(vec![("q1", "a1".to_string()), ("q2", "a2".to_string())]);
        assert_eq!(combined, "複数の質問への回答:\n\n質問1: q1\na1\n\n質問2: q2\na2");
    }
}
