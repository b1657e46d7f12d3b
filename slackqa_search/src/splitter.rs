use std::collections::HashSet;
use std::sync::Arc;

use slackqa_core::{LLMProvider, complete, extract_array};
use tracing::{info, warn};

/// Splits compound questions without letting the model rewrite them.
pub struct QuestionSplitter {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

fn build_prompt(query: &str) -> String {
    format!(
        r#"Input question: "{query}"

Requirements:
1. If the input contains multiple questions, split them into individual questions
2. If the input is a single question, return it exactly as is without any modifications
3. Do not paraphrase, summarize, or modify the original text
4. Do not add or remove any words from the original questions
5. Only split when there are clearly separate questions (e.g., marked by ？, 。, or conjunction words like また、そして、それから)

Example input 1 (multiple questions):
"プロジェクトの進捗状況を教えて。また、次のミーティングはいつですか？"
Expected output 1: ["プロジェクトの進捗状況を教えて。", "次のミーティングはいつですか？"]

Example input 2 (single question):
"プロジェクトの進捗状況を教えて"
Expected output 2: ["プロジェクトの進捗状況を教えて"]

Return only a JSON array of strings."#
    )
}

/// Accept the model's split only if it is non-empty, a lone entry equals the
/// query, and every entry occurs verbatim in the query. Repeated entries are
/// collapsed first, so a duplicated half never stands in for the whole query.
fn validate(query: &str, parts: Vec<String>) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let parts: Vec<String> = parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect();

    if parts.is_empty() {
        return None;
    }
    if parts.len() == 1 && parts[0] != query.trim() {
        return None;
    }
    if parts.iter().any(|p| !query.contains(p.as_str())) {
        return None;
    }
    Some(parts)
}

impl QuestionSplitter {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Never empty; `[query]` whenever the split cannot be trusted.
    pub async fn split(&self, query: &str) -> Vec<String> {
        let fallback = || vec![query.to_string()];

        let prompt = build_prompt(query);
        let response = match complete(self.provider.as_ref(), &self.model, &prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Question split failed: {e}");
                return fallback();
            }
        };

        let parts: Vec<String> = match extract_array(&response) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("Question split unparsable: {e}");
                return fallback();
            }
        };

        match validate(query, parts) {
            Some(parts) => {
                info!("Split into {} question(s)", parts.len());
                for (i, part) in parts.iter().enumerate() {
                    info!("  {}. {part}", i + 1);
                }
                parts
            }
            None => {
                warn!("Rejected question split that does not match the input");
                fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    const COMPOUND: &str = "プロジェクトの進捗状況を教えて。また、次のミーティングはいつですか？";

    #[test]
    fn verbatim_split_is_accepted() {
        let parts = strings(&["プロジェクトの進捗状況を教えて。", "次のミーティングはいつですか？"]);
        assert_eq!(validate(COMPOUND, parts.clone()), Some(parts));
    }

    #[test]
    fn single_rewritten_question_is_rejected() {
        assert_eq!(validate("会議はいつ？", strings(&["次の会議の日程"])), None);
        assert_eq!(
            validate("会議はいつ？", strings(&[" 会議はいつ？ "])),
            Some(strings(&["会議はいつ？"]))
        );
    }

    #[test]
    fn paraphrased_parts_are_rejected() {
        let parts = strings(&["プロジェクトの進捗は？", "次のミーティングはいつですか？"]);
        assert_eq!(validate(COMPOUND, parts), None);
    }

    #[test]
    fn repeated_parts_are_collapsed() {
        let question = "会議はいつ？";
        assert_eq!(
            validate(question, strings(&[question, question])),
            Some(strings(&[question]))
        );

        let first = "プロジェクトの進捗状況を教えて。";
        assert_eq!(validate(COMPOUND, strings(&[first, first])), None);

        let parts = strings(&[first, "次のミーティングはいつですか？", first]);
        assert_eq!(
            validate(COMPOUND, parts),
            Some(strings(&[first, "次のミーティングはいつですか？"]))
        );
    }

    #[test]
    fn empty_split_is_rejected() {
        assert_eq!(validate(COMPOUND, strings(&["", "  "])), None);
    }
}
