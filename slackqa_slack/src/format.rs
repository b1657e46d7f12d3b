//! Splitting long replies for posting.

use std::time::Duration;

use tracing::debug;

use crate::{MessageSink, Result};

/// Slack rejects very long `text` fields; replies are split below this.
pub const DEFAULT_CHUNK_SIZE: usize = 3000;

pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_secs(1);

/// Split `text` on line boundaries into pieces of at most `limit` chars.
///
/// Lines longer than `limit` are cut hard. With more than one piece each
/// gets a `(Part i/N)` header line.
#[must_use]
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_size = 0;

    for line in text.split('\n').flat_map(|line| split_line(line, limit)) {
        let line_size = line.chars().count() + 1;
        if current_size + line_size > limit && !current.is_empty() {
            chunks.push(current.join("\n"));
            current.clear();
            current_size = 0;
        }
        current_size += line_size;
        current.push(line);
    }
    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    let total = chunks.len();
    if total == 1 {
        return chunks;
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| format!("(Part {}/{total})\n{chunk}", i + 1))
        .collect()
}

fn split_line(line: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= limit {
        return vec![line.to_string()];
    }
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}

/// Post `text` into a thread, pausing `delay` between consecutive chunks.
pub async fn post_in_chunks(
    sink: &dyn MessageSink,
    channel: &str,
    thread_ts: Option<&str>,
    text: &str,
    chunk_size: usize,
    delay: Duration,
) -> Result<()> {
    let chunks = chunk_message(text, chunk_size);
    debug!("Posting reply in {} chunk(s)", chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        sink.post_message(channel, chunk, thread_ts).await?;
    }
    Ok(())
}
