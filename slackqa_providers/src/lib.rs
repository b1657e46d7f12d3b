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

//! Language-model backends.

mod gemini;
mod openai;
pub mod retry;

pub use gemini::{GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL, GeminiProvider};
pub use openai::{OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL, OpenAiCompatibleProvider};
pub use retry::{RetryPolicy, retry_with_backoff};
