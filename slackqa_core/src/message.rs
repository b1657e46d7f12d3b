//! Chat messages as seen by the retrieval pipeline.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::clamp_unit;
use crate::store::UserInfo;

/// Rendering used whenever a message time is shown to the model or the user.
pub const TIME_FORMAT: &str = "%Y年%m月%d日 %H:%M";

/// Placeholder for messages whose timestamp cannot be decoded.
pub const UNKNOWN_TIME: &str = "不明な時刻";

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// A message record sourced from the chat store.
///
/// `ts` is the string-encoded epoch timestamp the platform also uses as the
/// message id, so it doubles as the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMessage {
    pub ts: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Resolved author, when a lookup was made.
    #[serde(default)]
    pub author: Option<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    pub filetype: String,
    pub size: u64,
}

/// Human-readable size with one decimal, in binary units up to TB.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{size:.1}{unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}TB")
}

/// `添付ファイル:` followed by one `- name (type, size)` line per file;
/// empty when there are no files.
#[must_use]
pub fn format_file_attachments(files: &[FileAttachment]) -> String {
    if files.is_empty() {
        return String::new();
    }
    let mut lines = vec!["添付ファイル:".to_string()];
    lines.extend(
        files
            .iter()
            .map(|f| format!("- {} ({}, {})", f.name, f.filetype, format_file_size(f.size))),
    );
    lines.join("\n")
}

impl CandidateMessage {
    #[must_use]
    pub fn new(ts: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            user: None,
            text: text.into(),
            files: Vec::new(),
            links: Vec::new(),
            channel: None,
            author: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Decode `ts` ("1700000000.123456") into a UTC instant.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let ts = self.ts.trim();
        let (secs, frac) = ts.split_once('.').unwrap_or((ts, ""));
        let secs: i64 = secs.parse().ok()?;

        let mut digits: String = frac.chars().take(9).collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        while digits.len() < 9 {
            digits.push('0');
        }
        let nanos: u32 = digits.parse().ok()?;

        DateTime::from_timestamp(secs, nanos)
    }

    /// Local, human-readable send time.
    #[must_use]
    pub fn local_time(&self) -> String {
        self.timestamp().map_or_else(
            || UNKNOWN_TIME.to_string(),
            |t| t.with_timezone(&Local).format(TIME_FORMAT).to_string(),
        )
    }
}

/// A candidate that matched at least one search keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub message: CandidateMessage,
    matched_keywords: BTreeSet<String>,
    relevance_score: f64,
}

impl SearchResult {
    /// Returns `None` when no keyword matched.
    #[must_use]
    pub fn new(message: CandidateMessage, matched_keywords: BTreeSet<String>) -> Option<Self> {
        if matched_keywords.is_empty() {
            return None;
        }
        Some(Self {
            message,
            matched_keywords,
            relevance_score: 0.0,
        })
    }

    #[must_use]
    pub const fn matched_keywords(&self) -> &BTreeSet<String> {
        &self.matched_keywords
    }

    #[must_use]
    pub const fn relevance_score(&self) -> f64 {
        self.relevance_score
    }

    pub fn set_relevance_score(&mut self, score: f64) {
        self.relevance_score = clamp_unit(score);
    }

    #[must_use]
    pub fn into_message(self) -> CandidateMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_slack_timestamp() {
        let msg = CandidateMessage::new("1700000000.123456", "hi");
        let ts = msg.timestamp();
        assert_eq!(ts.map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(ts.map(|t| t.timestamp_subsec_micros()), Some(123_456));
    }

    #[test]
    fn integer_timestamp_is_accepted() {
        let msg = CandidateMessage::new("1700000000", "hi");
        assert_eq!(msg.timestamp().map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn garbage_timestamp_renders_placeholder() {
        let msg = CandidateMessage::new("not-a-ts", "hi");
        assert!(msg.timestamp().is_none());
        assert_eq!(msg.local_time(), UNKNOWN_TIME);

        let msg = CandidateMessage::new("17.ab", "hi");
        assert!(msg.timestamp().is_none());
    }

    #[test]
    fn local_time_has_japanese_layout() {
        let rendered = CandidateMessage::new("1700000000.000100", "hi").local_time();
        assert!(rendered.contains('年') && rendered.contains('月') && rendered.contains('日'));
        assert!(rendered.contains(':'));
    }

    #[test]
    fn file_sizes_use_binary_units() {
        assert_eq!(format_file_size(0), "0.0B");
        assert_eq!(format_file_size(1023), "1023.0B");
        assert_eq!(format_file_size(1536), "1.5KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3.0TB");
    }

    #[test]
    fn attachments_are_listed_under_a_header() {
        let files = [FileAttachment {
            name: "plan.pdf".to_string(),
            filetype: "pdf".to_string(),
            size: 2048,
        }];
        assert_eq!(format_file_attachments(&files), "添付ファイル:\n- plan.pdf (pdf, 2.0KB)");
        assert_eq!(format_file_attachments(&[]), "");
    }

    #[test]
    fn empty_keywords_are_rejected() {
        let msg = CandidateMessage::new("1", "hi");
        assert!(SearchResult::new(msg.clone(), BTreeSet::new()).is_none());
        let result = SearchResult::new(msg, BTreeSet::from(["hi".to_string()]));
        assert!(result.is_some());
    }

    #[test]
    fn relevance_is_clamped() {
        let msg = CandidateMessage::new("1", "hi");
        let Some(mut result) = SearchResult::new(msg, BTreeSet::from(["hi".to_string()])) else {
            return;
        };
        result.set_relevance_score(3.5);
        assert!((result.relevance_score() - 1.0).abs() < f64::EPSILON);
    }
}
