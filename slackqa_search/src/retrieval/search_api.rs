use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use slackqa_core::{
    CandidateMessage, ChatStore, SearchResult, SearchTerm, UserInfo, clean_slack_message,
    extract_links,
};
use tracing::{debug, info, warn};

use super::MessageRetriever;

/// Runs every term through the workspace search API and keeps matches from
/// the target channel that contain a relevant sentence.
pub struct SearchApiRetriever {
    store: Arc<dyn ChatStore>,
    count: usize,
}

impl SearchApiRetriever {
    pub fn new(store: Arc<dyn ChatStore>, count: usize) -> Self {
        Self { store, count }
    }

    async fn resolve_author(
        &self,
        user_id: &str,
        cache: &mut HashMap<String, UserInfo>,
    ) -> UserInfo {
        if let Some(info) = cache.get(user_id) {
            return info.clone();
        }
        let info = match self.store.user_info(user_id).await {
            Ok(info) => info,
            Err(e) => {
                debug!("User lookup failed for {user_id}: {e}");
                UserInfo::unknown(user_id)
            }
        };
        cache.insert(user_id.to_string(), info.clone());
        info
    }
}

/// Lower-cased keywords of at least two characters.
fn significant_keywords(term: &SearchTerm) -> Vec<String> {
    term.keywords()
        .iter()
        .filter(|k| k.chars().count() >= 2)
        .map(|k| k.to_lowercase())
        .collect()
}

/// `。`-delimited sentences containing any of `keywords`.
#[must_use]
pub fn relevant_sentences(text: &str, keywords: &[String]) -> Vec<String> {
    text.split('。')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}。"))
        .filter(|s| {
            let lower = s.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .collect()
}

#[async_trait]
impl MessageRetriever for SearchApiRetriever {
    async fn retrieve(
        &self,
        channel_id: &str,
        terms: &[SearchTerm],
        _query: &str,
        min_relevance: f64,
    ) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = Vec::new();
        let mut seen_ts = HashSet::new();
        let mut authors = HashMap::new();

        for term in terms {
            let search_query = term.to_string();
            let matches = match self.store.search(&search_query, self.count).await {
                Ok(matches) => matches,
                Err(e) => {
                    warn!("Search failed for '{search_query}': {e}");
                    continue;
                }
            };
            debug!("Search '{search_query}' returned {} match(es)", matches.len());

            let keywords = significant_keywords(term);
            let mut kept = 0;
            for message in matches {
                if seen_ts.contains(&message.ts) || message.channel.as_deref() != Some(channel_id) {
                    continue;
                }

                let text = clean_slack_message(&message.text);
                if relevant_sentences(&text, &keywords).is_empty() {
                    continue;
                }

                let lower = text.to_lowercase();
                let matched: BTreeSet<String> = keywords
                    .iter()
                    .filter(|k| lower.contains(k.as_str()))
                    .cloned()
                    .collect();

                #[expect(clippy::cast_precision_loss, reason = "keyword counts are small")]
                let share = matched.len() as f64 / keywords.len().max(1) as f64;

                let author = match &message.user {
                    Some(user) => Some(self.resolve_author(user, &mut authors).await),
                    None => None,
                };
                let links = if message.links.is_empty() {
                    extract_links(&message.text)
                } else {
                    message.links.clone()
                };
                let ts = message.ts.clone();
                let cleaned = CandidateMessage {
                    text,
                    links,
                    author,
                    ..message
                };

                if let Some(mut result) = SearchResult::new(cleaned, matched) {
                    result.set_relevance_score(share);
                    if result.relevance_score() >= min_relevance {
                        seen_ts.insert(ts);
                        results.push(result);
                        kept += 1;
                    }
                }
            }
            debug!("Search '{search_query}' kept {kept} message(s)");
        }

        results.sort_by(|a, b| b.message.timestamp().cmp(&a.message.timestamp()));
        info!("Search API: {} message(s) from {} term(s)", results.len(), terms.len());
        results
    }
}
