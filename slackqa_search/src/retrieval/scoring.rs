//! Keyword matching and the relevance heuristic used by history retrieval.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use slackqa_core::{CandidateMessage, SearchResult, SearchTerm};

const KEYWORD_WEIGHT: f64 = 0.6;
const PRESENCE_WEIGHT: f64 = 0.4;

/// Keep messages whose text contains at least one term keyword.
///
/// Messages are deduplicated on their lower-cased, trimmed text; operator
/// tokens never take part in matching.
#[must_use]
pub fn find_keyword_matches(
    messages: Vec<CandidateMessage>,
    terms: &[SearchTerm],
) -> Vec<SearchResult> {
    let keywords: Vec<String> = terms
        .iter()
        .flat_map(SearchTerm::keywords)
        .map(|k| k.to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for message in messages {
        let text = message.text.trim().to_lowercase();
        if text.is_empty() || seen.contains(&text) {
            continue;
        }

        let matched: BTreeSet<String> = keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .cloned()
            .collect();

        if let Some(result) = SearchResult::new(message, matched) {
            results.push(result);
            seen.insert(text);
        }
    }
    results
}

/// Lower-cased whitespace tokens of the query.
#[must_use]
pub fn query_tokens(query: &str) -> HashSet<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// `0.6 * matched / |query tokens| + 0.4 * [any query token in text]`, clamped.
#[must_use]
pub fn relevance(result: &SearchResult, tokens: &HashSet<String>) -> f64 {
    let text = result.message.text.trim().to_lowercase();

    #[expect(clippy::cast_precision_loss, reason = "keyword counts are small")]
    let keyword_score = if tokens.is_empty() {
        0.0
    } else {
        result.matched_keywords().len() as f64 / tokens.len() as f64
    };
    let presence = if tokens.iter().any(|t| text.contains(t.as_str())) {
        1.0
    } else {
        0.0
    };

    (KEYWORD_WEIGHT * keyword_score + PRESENCE_WEIGHT * presence).min(1.0)
}

pub fn score_all(results: &mut [SearchResult], query: &str) {
    let tokens = query_tokens(query);
    for result in results.iter_mut() {
        let score = relevance(result, &tokens);
        result.set_relevance_score(score);
    }
}

/// Sort by (matched keyword count, score) descending and drop results
/// under `min_relevance`.
#[must_use]
pub fn rank_and_filter(mut results: Vec<SearchResult>, min_relevance: f64) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.matched_keywords()
            .len()
            .cmp(&a.matched_keywords().len())
            .then_with(|| {
                b.relevance_score()
                    .partial_cmp(&a.relevance_score())
                    .unwrap_or(Ordering::Equal)
            })
    });
    results.retain(|r| r.relevance_score() >= min_relevance);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(raw: &[&str]) -> Vec<SearchTerm> {
        raw.iter().map(|t| SearchTerm::parse(t)).collect()
    }

    fn msg(ts: &str, text: &str) -> CandidateMessage {
        CandidateMessage::new(ts, text)
    }

    #[test]
    fn unmatched_and_duplicate_messages_are_dropped() {
        let results = find_keyword_matches(
            vec![
                msg("1", "研修は月曜です"),
                msg("2", "  研修は月曜です "),
                msg("3", "ランチの話"),
                msg("4", ""),
            ],
            &terms(&["研修"]),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message.ts, "1");
    }

    #[test]
    fn operators_are_not_matched_as_text() {
        let results = find_keyword_matches(
            vec![msg("1", "after:2024-01-01 was mentioned")],
            &terms(&["研修 after:2024-01-01"]),
        );
        assert!(results.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let results =
            find_keyword_matches(vec![msg("1", "Slack Huddle notes")], &terms(&["huddle"]));
        assert_eq!(
            results[0].matched_keywords().iter().collect::<Vec<_>>(),
            vec!["huddle"]
        );
    }

    #[test]
    fn full_match_scores_one() {
        let mut results = find_keyword_matches(
            vec![msg("1", "release planning meeting tomorrow")],
            &terms(&["release", "planning", "meeting"]),
        );
        score_all(&mut results, "release planning");
        assert!((results[0].relevance_score() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn keyword_only_match_scores_proportionally() {
        let mut results =
            find_keyword_matches(vec![msg("1", "budget review")], &terms(&["budget"]));
        score_all(&mut results, "quarterly sales numbers");
        let expected = 0.6 * (1.0 / 3.0);
        assert!((results[0].relevance_score() - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_query_has_no_keyword_score() {
        let mut results = find_keyword_matches(vec![msg("1", "budget")], &terms(&["budget"]));
        score_all(&mut results, "   ");
        assert!(results[0].relevance_score().abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_prefers_more_keywords_then_score() {
        let mut results = find_keyword_matches(
            vec![
                msg("1", "budget"),
                msg("2", "budget review q3"),
                msg("3", "review"),
            ],
            &terms(&["budget", "review"]),
        );
        score_all(&mut results, "budget review");
        let ranked = rank_and_filter(results, 0.0);
        let order: Vec<&str> = ranked.iter().map(|r| r.message.ts.as_str()).collect();
        assert_eq!(order, vec!["2", "1", "3"]);
    }

    #[test]
    fn threshold_filters_low_scores() {
        let mut results = find_keyword_matches(vec![msg("1", "budget")], &terms(&["budget"]));
        score_all(&mut results, "x y z w v q");
        assert!(rank_and_filter(results, 0.3).is_empty());
    }
}
