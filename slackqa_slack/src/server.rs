//! Slack Events API endpoint.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/slack/events` | Event callbacks and URL verification |
//! | `GET`  | `/health` | Liveness check |
//!
//! Mentions are acknowledged immediately and answered from a background
//! task; Slack expects a response within three seconds.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use slackqa_config::ServerConfig;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::handler::{MentionEvent, MentionHandler};
use crate::{Result, SlackError};

type HmacSha256 = Hmac<Sha256>;

/// Requests older than this are rejected as possible replays.
pub const MAX_REQUEST_AGE_SECS: i64 = 60 * 5;

const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const SIGNATURE_HEADER: &str = "x-slack-signature";
const RETRY_HEADER: &str = "x-slack-retry-num";

#[derive(Clone)]
pub struct AppState {
    handler: MentionHandler,
    signing_secret: Option<Arc<str>>,
}

impl AppState {
    /// An empty secret disables signature checks.
    #[must_use]
    pub fn new(handler: MentionHandler, signing_secret: &str) -> Self {
        let signing_secret = (!signing_secret.is_empty()).then(|| Arc::from(signing_secret));
        Self {
            handler,
            signing_secret,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    UrlVerification { challenge: String },
    EventCallback { event: Value },
    #[serde(other)]
    Other,
}

#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(handle_events))
        .route("/health", get(handle_health))
        .with_state(state)
}

pub async fn run_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening for Slack events on http://{bind_addr}/slack/events");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn handle_events(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(secret) = state.signing_secret.as_deref() {
        if let Err(e) = check_request(secret, &headers, &body) {
            warn!("Rejected Slack request: {e}");
            return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
        }
    }

    if headers.contains_key(RETRY_HEADER) {
        debug!("Ignoring Slack redelivery");
        return StatusCode::OK.into_response();
    }

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Malformed Slack payload: {e}");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match envelope {
        Envelope::UrlVerification { challenge } => {
            Json(json!({ "challenge": challenge })).into_response()
        }
        Envelope::EventCallback { event } => {
            dispatch_event(&state, event);
            StatusCode::OK.into_response()
        }
        Envelope::Other => StatusCode::OK.into_response(),
    }
}

fn dispatch_event(state: &AppState, event: Value) {
    if event.get("type").and_then(Value::as_str) != Some("app_mention") {
        return;
    }
    let mention: MentionEvent = match serde_json::from_value(event) {
        Ok(mention) => mention,
        Err(e) => {
            warn!("Unreadable app_mention event: {e}");
            return;
        }
    };

    let handler = state.handler.clone();
    let span = info_span!("app_mention", channel = %mention.channel, ts = %mention.ts);
    tokio::spawn(async move { handler.handle(&mention).await }.instrument(span));
}

fn check_request(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<()> {
    let timestamp = header(headers, TIMESTAMP_HEADER)?;
    let signature = header(headers, SIGNATURE_HEADER)?;
    verify_signature(secret, timestamp, body, signature, chrono::Utc::now().timestamp())
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SlackError::MissingHeader(name))
}

/// Check a `v0=` request signature: HMAC-SHA256 over `v0:{timestamp}:{body}`.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<()> {
    let sent_at: i64 = timestamp.trim().parse().map_err(|_| SlackError::StaleRequest)?;
    if (now - sent_at).abs() > MAX_REQUEST_AGE_SECS {
        return Err(SlackError::StaleRequest);
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SlackError::InvalidSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SlackError::Config(format!("signing secret: {e}")))?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| SlackError::InvalidSignature)
}
