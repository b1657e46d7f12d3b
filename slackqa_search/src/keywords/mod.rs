//! Search-term generation.

mod local;

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slackqa_core::{LLMProvider, SearchConstraints, SearchTerm, complete, extract_array};
use tracing::{debug, info, warn};

pub use local::LocalKeywordGenerator;

use crate::retry::AttemptContext;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Attempts (from the first) that ask the model; later ones go local.
    #[serde(default = "KeywordConfig::default_model_attempts")]
    pub model_attempts: usize,
    /// Number of terms requested from the model.
    #[serde(default = "KeywordConfig::default_min_terms")]
    pub min_terms: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            model_attempts: Self::default_model_attempts(),
            min_terms: Self::default_min_terms(),
        }
    }
}

impl KeywordConfig {
    const fn default_model_attempts() -> usize {
        2
    }

    const fn default_min_terms() -> usize {
        15
    }
}

/// Produces the search terms for one retrieval attempt.
///
/// An empty result tells the caller to stop retrying.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    async fn generate(
        &self,
        query: &str,
        constraints: &SearchConstraints,
        attempt: AttemptContext,
    ) -> Vec<SearchTerm>;
}

pub struct KeywordGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    local: LocalKeywordGenerator,
    config: KeywordConfig,
}

impl KeywordGenerator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        config: KeywordConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            local: LocalKeywordGenerator::new(),
            config,
        }
    }

    fn build_prompt(&self, query: &str, constraints: &SearchConstraints) -> String {
        let has_latin = query.chars().any(|c| c.is_ascii_alphabetic());
        let language = if has_latin {
            "- Include English variations"
        } else {
            "- Use only Japanese terms"
        };

        let operator_section = if constraints.is_empty() {
            String::new()
        } else {
            let mut operators = String::new();
            if let Some(start) = constraints.start_date {
                let _ = writeln!(operators, "   - Date range: after:{}", start.format("%Y-%m-%d"));
            }
            if let Some(end) = constraints.end_date {
                let _ = writeln!(operators, "   - Date range: before:{}", end.format("%Y-%m-%d"));
            }
            if let Some(user) = &constraints.user_id {
                let _ = writeln!(operators, "   - User filter: from:<@{user}>");
            }
            format!("\n5. Search operator combinations:\n{operators}")
        };

        format!(
            r#"Generate search keywords based on: "{query}"

Requirements:
1. Generate concise search terms (maximum 2-3 words per term)
2. Focus on essential words and their combinations
3. Consider the following variations:
   - Core keywords from the query
   - Similar meaning words (同義語)
   - Common abbreviations
   - Key noun-verb pairs
   {language}

4. Generate **at least {min_terms} search terms**
{operator_section}
Keyword guidelines:
   - Keep terms short and precise
   - Break down long phrases into shorter combinations
   - Prioritize nouns and verbs
   - Avoid long sentences or phrases

Example input: "新入社員の研修スケジュールについて"
Example output: ["研修", "新入社員", "研修 スケジュール", "新人 研修", "研修 日程", "after:2024-01-01 研修", "from:<@UXXXXXXXX> 研修"]

Return only a JSON array of strings, without any explanation."#,
            min_terms = self.config.min_terms,
        )
    }

    async fn from_model(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> anyhow::Result<Vec<SearchTerm>> {
        let prompt = self.build_prompt(query, constraints);
        let response = complete(self.provider.as_ref(), &self.model, &prompt).await?;
        let raw: Vec<String> = extract_array(&response)?;
        Ok(normalize(raw.iter().map(|t| SearchTerm::parse(t))))
    }

    /// Combinatorial terms with the constraint operators appended.
    #[must_use]
    pub fn local_terms(&self, query: &str, constraints: &SearchConstraints) -> Vec<SearchTerm> {
        let modifiers = constraints.modifiers();
        normalize(
            self.local
                .generate(query)
                .iter()
                .map(|t| SearchTerm::parse(t).with_modifiers(&modifiers)),
        )
    }
}

/// Drop empties, dedupe on the rendered text (case-sensitive) and sort
/// shortest first.
fn normalize(terms: impl Iterator<Item = SearchTerm>) -> Vec<SearchTerm> {
    let mut seen = HashSet::new();
    let mut unique: Vec<SearchTerm> = terms
        .filter(|t| !t.keywords().is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .collect();
    unique.sort_by_key(SearchTerm::char_len);
    unique
}

#[async_trait]
impl KeywordSource for KeywordGenerator {
    async fn generate(
        &self,
        query: &str,
        constraints: &SearchConstraints,
        attempt: AttemptContext,
    ) -> Vec<SearchTerm> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let terms = if attempt.index < self.config.model_attempts {
            match self.from_model(query, constraints).await {
                Ok(terms) if !terms.is_empty() => terms,
                Ok(_) => {
                    warn!("Model returned no usable keywords, using local generator");
                    self.local_terms(query, constraints)
                }
                Err(e) => {
                    warn!("Keyword generation failed, using local generator: {e}");
                    self.local_terms(query, constraints)
                }
            }
        } else {
            debug!("Attempt {} uses local keyword generator", attempt.index + 1);
            self.local_terms(query, constraints)
        };

        let terms = if terms.is_empty() {
            vec![SearchTerm::parse(query).with_modifiers(&constraints.modifiers())]
        } else {
            terms
        };

        info!("Generated {} search term(s) for '{query}'", terms.len());
        for term in &terms {
            debug!("  term: {term}");
        }
        terms
    }
}
