//! Search terms and the operator suffixes understood by the search API.

use std::fmt;

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchModifier {
    After(NaiveDate),
    Before(NaiveDate),
    From(String),
}

impl SearchModifier {
    /// Parse a single `after:` / `before:` / `from:` token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if let Some(date) = token.strip_prefix("after:") {
            return NaiveDate::parse_from_str(date, DATE_FORMAT).ok().map(Self::After);
        }
        if let Some(date) = token.strip_prefix("before:") {
            return NaiveDate::parse_from_str(date, DATE_FORMAT).ok().map(Self::Before);
        }
        if let Some(user) = token.strip_prefix("from:") {
            let user = user.trim_start_matches("<@").trim_end_matches('>');
            if user.is_empty() {
                return None;
            }
            return Some(Self::From(user.to_string()));
        }
        None
    }
}

impl fmt::Display for SearchModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::After(date) => write!(f, "after:{}", date.format(DATE_FORMAT)),
            Self::Before(date) => write!(f, "before:{}", date.format(DATE_FORMAT)),
            Self::From(user) => write!(f, "from:<@{user}>"),
        }
    }
}

/// A short search string plus optional operator suffixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm {
    keywords: Vec<String>,
    modifiers: Vec<SearchModifier>,
}

impl SearchTerm {
    /// Split raw text into keywords and recognised operator tokens.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut keywords = Vec::new();
        let mut modifiers = Vec::new();
        for token in raw.split_whitespace() {
            match SearchModifier::parse(token) {
                Some(modifier) => modifiers.push(modifier),
                None => keywords.push(token.to_string()),
            }
        }
        Self { keywords, modifiers }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: &[SearchModifier]) -> Self {
        for modifier in modifiers {
            if !self.modifiers.contains(modifier) {
                self.modifiers.push(modifier.clone());
            }
        }
        self
    }

    /// Plain keywords, operators excluded.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    #[must_use]
    pub fn modifiers(&self) -> &[SearchModifier] {
        &self.modifiers
    }

    /// Keywords joined by a single space.
    #[must_use]
    pub fn text(&self) -> String {
        self.keywords.join(" ")
    }

    /// Length in characters of the rendered term.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.to_string().chars().count()
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for keyword in &self.keywords {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(keyword)?;
            first = false;
        }
        for modifier in &self.modifiers {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{modifier}")?;
            first = false;
        }
        Ok(())
    }
}

/// Date/user restrictions that become operator suffixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConstraints {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<String>,
}

impl SearchConstraints {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.user_id.is_none()
    }

    #[must_use]
    pub fn modifiers(&self) -> Vec<SearchModifier> {
        let mut modifiers = Vec::new();
        if let Some(start) = self.start_date {
            modifiers.push(SearchModifier::After(start));
        }
        if let Some(end) = self.end_date {
            modifiers.push(SearchModifier::Before(end));
        }
        if let Some(user) = &self.user_id {
            modifiers.push(SearchModifier::From(user.clone()));
        }
        modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_operators_out_of_keywords() {
        let term = SearchTerm::parse("after:2024-01-01 研修 from:<@U123>");
        assert_eq!(term.keywords(), ["研修".to_string()]);
        assert_eq!(term.modifiers().len(), 2);
        assert_eq!(term.to_string(), "研修 after:2024-01-01 from:<@U123>");
    }

    #[test]
    fn malformed_operator_stays_a_keyword() {
        let term = SearchTerm::parse("after:someday 会議");
        assert_eq!(term.keywords().len(), 2);
        assert!(term.modifiers().is_empty());
    }

    #[test]
    fn constraints_render_in_order() {
        let constraints = SearchConstraints {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            user_id: Some("U42".to_string()),
        };
        let term = SearchTerm::parse("売上").with_modifiers(&constraints.modifiers());
        assert_eq!(
            term.to_string(),
            "売上 after:2024-03-01 before:2024-03-31 from:<@U42>"
        );
    }

    #[test]
    fn constraints_without_fields_are_empty() {
        assert!(SearchConstraints::default().is_empty());
        let by_user = SearchConstraints {
            user_id: Some("U1".to_string()),
            ..SearchConstraints::default()
        };
        assert!(!by_user.is_empty());
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(SearchTerm::parse("研修 日程").char_len(), 5);
    }
}
