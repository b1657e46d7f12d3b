#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Question answering over chat history.
//!
//! A query flows through [`QuestionSplitter`], then per sub-question through
//! a [`KeywordSource`] and a [`MessageRetriever`] driven by
//! [`RetryStrategy`], and finally through [`AnswerGenerator`].
//! [`SearchSystem`] wires the stages together.

pub mod answer;
pub mod keywords;
pub mod pipeline;
pub mod retrieval;
pub mod retry;
pub mod splitter;

pub use answer::{
    AnswerCache, AnswerConfig, AnswerGenerator, CacheKey, NO_INFORMATION_ANSWER, QuestionType,
};
pub use keywords::{KeywordConfig, KeywordGenerator, KeywordSource, LocalKeywordGenerator};
pub use pipeline::{NO_RESULTS_ANSWER, PipelineConfig, SearchSystem};
pub use retrieval::{
    HistoryRetriever, MessageRetriever, RetrievalConfig, RetrievalStrategy, SearchApiRetriever,
    build_retriever,
};
pub use retry::{AbortReason, AttemptContext, RetryConfig, RetryOutcome, RetryState, RetryStrategy};
pub use splitter::QuestionSplitter;
