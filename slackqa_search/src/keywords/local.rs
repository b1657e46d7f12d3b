//! Model-free keyword expansion: script-run tokenizer, stop words,
//! a small synonym dictionary and pairwise combinations.

use std::collections::HashSet;

const STOP_WORDS: &[&str] = &[
    "する", "てる", "いる", "ある", "なる", "どこ", "なに", "だれ", "いつ", "どう", "こと", "もの",
    "ところ", "とき", "ため", "どれ", "これ", "それ", "あれ", "この", "その", "あの", "どの",
    "お願い", "ください", "おねがい", "です", "ます", "か", "の", "は",
    // English question words and fillers
    "what", "how", "where", "which", "who", "when", "why", "a", "an", "the", "is", "are", "was",
    "were", "do", "does", "did", "about",
];

/// Canonical term and its synonyms; matching works in both directions.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("新入社員", &["新人", "フレッシャーズ"]),
    ("スケジュール", &["日程", "予定", "計画", "スケ"]),
    ("会議", &["ミーティング", "打ち合わせ", "打合せ"]),
    ("報告", &["レポート", "報告書", "レポーティング"]),
    ("資料", &["ドキュメント", "書類", "データ"]),
    ("売上", &["売り上げ", "売上高", "売上金額"]),
    ("研修", &["トレーニング", "講習", "研修会"]),
    ("キャンセル", &["解約", "返品", "取消"]),
    ("顧客", &["取引先", "お客様", "クライアント", "得意先"]),
    ("商品", &["製品", "品物", "アイテム"]),
    ("納期", &["出荷日", "配送日", "出荷予定日"]),
    ("在庫", &["在庫数", "ストック", "在庫状況"]),
    ("担当者", &["担当", "責任者", "PIC"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Kanji,
    Katakana,
    Word,
    Hiragana,
    Other,
}

/// Kana and kanji get their own runs; any other letter or digit
/// (accented Latin, full-width forms, other scripts) is a word character.
fn script(c: char) -> Script {
    match c {
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '々' | '〆' => Script::Kanji,
        '\u{30A0}'..='\u{30FF}' | '\u{FF66}'..='\u{FF9F}' => Script::Katakana,
        '\u{3040}'..='\u{309F}' => Script::Hiragana,
        c if c.is_alphanumeric() || c == '_' => Script::Word,
        _ => Script::Other,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalKeywordGenerator;

impl LocalKeywordGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Split text into runs of one script. Hiragana runs act as particles
    /// and are dropped together with punctuation.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_script = Script::Other;

        for c in text.chars() {
            let s = script(c);
            if s != current_script && !current.is_empty() {
                if current_script != Script::Hiragana {
                    tokens.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            current_script = s;
            if !matches!(s, Script::Other) {
                current.push(c);
            }
        }
        if !current.is_empty() && current_script != Script::Hiragana {
            tokens.push(current);
        }
        tokens
    }

    /// Tokens minus stop words, plus every synonym group they touch.
    #[must_use]
    pub fn extract_words(&self, text: &str) -> Vec<String> {
        let words: Vec<String> = self
            .tokenize(text)
            .into_iter()
            .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
            .collect();

        let mut seen = HashSet::new();
        let mut expanded = Vec::new();
        let mut push = |word: &str| {
            if seen.insert(word.to_string()) {
                expanded.push(word.to_string());
            }
        };

        for word in &words {
            push(word.as_str());
            for (canonical, synonyms) in SYNONYMS {
                if word == canonical || synonyms.contains(&word.as_str()) {
                    push(*canonical);
                    for synonym in *synonyms {
                        push(*synonym);
                    }
                }
            }
        }
        expanded
    }

    /// Every word alone plus every ordered pair, without duplicates.
    #[must_use]
    pub fn combinations(&self, words: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();
        let mut push = |term: String| {
            if seen.insert(term.clone()) {
                keywords.push(term);
            }
        };

        for (i, first) in words.iter().enumerate() {
            push(first.clone());
            for second in &words[i + 1..] {
                push(format!("{first} {second}"));
                push(format!("{second} {first}"));
            }
        }
        keywords
    }

    #[must_use]
    pub fn generate(&self, query: &str) -> Vec<String> {
        self.combinations(&self.extract_words(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_splits_on_script_boundaries() {
        let generator = LocalKeywordGenerator::new();
        assert_eq!(generator.tokenize("新入社員の研修について"), vec!["新入社員", "研修"]);
        assert_eq!(
            generator.tokenize("Slackの会議スケジュール2024"),
            vec!["Slack", "会議", "スケジュール", "2024"]
        );
    }

    #[test]
    fn accented_and_full_width_letters_stay_in_words() {
        let generator = LocalKeywordGenerator::new();
        assert_eq!(
            generator.tokenize("café ＡＢＣ１２３の研修"),
            vec!["café", "ＡＢＣ１２３", "研修"]
        );
        assert_eq!(generator.tokenize("Müller_2024"), vec!["Müller_2024"]);
    }

    #[test]
    fn stop_words_are_case_insensitive() {
        let generator = LocalKeywordGenerator::new();
        assert_eq!(
            generator.extract_words("What is the 会議"),
            vec!["会議", "ミーティング", "打ち合わせ", "打合せ"]
        );
        assert!(generator.extract_words("どこ").is_empty());
    }

    #[test]
    fn synonyms_expand_both_ways() {
        let generator = LocalKeywordGenerator::new();
        let from_synonym = generator.extract_words("ミーティング");
        assert!(from_synonym.contains(&"会議".to_string()));
        assert!(from_synonym.contains(&"打合せ".to_string()));

        let from_canonical = generator.extract_words("会議");
        assert!(from_canonical.contains(&"ミーティング".to_string()));
    }

    #[test]
    fn fallback_terms_cover_words_synonyms_and_pairs() {
        let terms = LocalKeywordGenerator::new().generate("新入社員の研修について");
        for expected in ["研修", "新入社員", "新人", "研修 新入社員", "新入社員 研修"] {
            assert!(terms.contains(&expected.to_string()), "missing {expected}");
        }
        let unique: HashSet<_> = terms.iter().collect();
        assert_eq!(unique.len(), terms.len());
    }

    #[test]
    fn pairs_are_ordered_both_ways() {
        let words = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            LocalKeywordGenerator::new().combinations(&words),
            vec!["a", "a b", "b a", "b"]
        );
    }
}
