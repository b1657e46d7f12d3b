use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlackError>;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Slack API error in {method}: {error}")]
    Api { method: String, error: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing request header: {0}")]
    MissingHeader(&'static str),

    #[error("Request timestamp outside the accepted window")]
    StaleRequest,

    #[error("Request signature mismatch")]
    InvalidSignature,

    #[error("Configuration error: {0}")]
    Config(String),
}
