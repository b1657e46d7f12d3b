use std::collections::HashMap;
use std::sync::Arc;

use slackqa_core::{AnswerQuality, CandidateMessage};
use tokio::sync::RwLock;

const NO_MESSAGES: &str = "no_messages";

/// Identity of a generated answer: the question plus the timestamp of the
/// first supporting message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    first_ts: String,
}

impl CacheKey {
    #[must_use]
    pub fn new(query: &str, messages: &[CandidateMessage]) -> Self {
        Self {
            query: query.to_string(),
            first_ts: messages
                .first()
                .map_or_else(|| NO_MESSAGES.to_string(), |m| m.ts.clone()),
        }
    }
}

/// Process-wide answer store.
///
/// Entries are never evicted. The lock is only held for the map operation,
/// so two requests missing on the same key both generate and the later
/// insert wins.
#[derive(Debug, Clone, Default)]
pub struct AnswerCache {
    entries: Arc<RwLock<HashMap<CacheKey, (String, AnswerQuality)>>>,
}

impl AnswerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<(String, AnswerQuality)> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, answer: String, quality: AnswerQuality) {
        self.entries.write().await.insert(key, (answer, quality));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_first_timestamp_or_sentinel() {
        let messages = vec![
            CandidateMessage::new("200.1", "b"),
            CandidateMessage::new("100.1", "a"),
        ];
        assert_eq!(CacheKey::new("q", &messages), CacheKey::new("q", &messages[..1]));
        assert_eq!(CacheKey::new("q", &[]).first_ts, NO_MESSAGES);
        assert_ne!(CacheKey::new("q", &messages), CacheKey::new("q2", &messages));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let cache = AnswerCache::new();
        let key = CacheKey::new("q", &[]);
        cache.insert(key.clone(), "first".to_string(), AnswerQuality::default()).await;
        cache.insert(key.clone(), "second".to_string(), AnswerQuality::fallback()).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&key).await.map(|(a, _)| a).as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = AnswerCache::new();
        let other = cache.clone();
        other
            .insert(CacheKey::new("q", &[]), "a".to_string(), AnswerQuality::default())
            .await;
        assert!(!cache.is_empty().await);
        cache.clear().await;
        assert!(other.is_empty().await);
    }
}
