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

//! Slack adapter: Web API client, reply formatting and the Events endpoint.

pub mod client;
pub mod error;
pub mod format;
pub mod handler;
pub mod server;

pub use client::{MessageSink, SLACK_API_URL, SlackClient};
pub use error::{Result, SlackError};
pub use format::{DEFAULT_CHUNK_DELAY, DEFAULT_CHUNK_SIZE, chunk_message, post_in_chunks};
pub use handler::{MentionEvent, MentionHandler, QueryService, SEARCH_STARTED_TEXT, USAGE_TEXT};
pub use server::{AppState, router, run_server, verify_signature};
