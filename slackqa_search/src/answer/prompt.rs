//! Question classification and answer/evaluation prompts.

use std::fmt;

use slackqa_core::{CandidateMessage, format_file_attachments};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    Location,
    Time,
    Who,
    What,
    How,
    Why,
    General,
}

/// Checked in order; the first category with a matching phrase wins.
const PATTERNS: &[(QuestionType, &[&str])] = &[
    (QuestionType::Location, &["どこ", "場所", "どの辺", "どちら"]),
    (QuestionType::Time, &["いつ", "何時", "時間"]),
    (QuestionType::Who, &["だれ", "誰", "何人"]),
    (QuestionType::What, &["なに", "何", "どんな"]),
    (QuestionType::How, &["どうやって", "どのように", "どうすれば"]),
    (QuestionType::Why, &["なぜ", "どうして", "理由"]),
];

impl QuestionType {
    #[must_use]
    pub fn classify(query: &str) -> Self {
        PATTERNS
            .iter()
            .find(|(_, phrases)| phrases.iter().any(|p| query.contains(p)))
            .map_or(Self::General, |(kind, _)| *kind)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Time => "time",
            Self::Who => "who",
            Self::What => "what",
            Self::How => "how",
            Self::Why => "why",
            Self::General => "general",
        }
    }

    const fn requirements(self) -> &'static str {
        match self {
            Self::Location => {
                "回答の要件:\n\
                 1. 場所に関する情報を明確に示す\n\
                 2. 「〜で」「〜にて」などの場所を示す表現を含める\n\
                 3. 可能であれば場所の詳細な状況も説明\n\
                 4. 不確かな場合はその旨を明記\n"
            }
            Self::Time => {
                "回答の要件:\n\
                 1. 時間情報を具体的に示す\n\
                 2. 日時の前後関係を明確に\n\
                 3. 継続時間や期間も記載（該当する場合）\n"
            }
            Self::Who => {
                "回答の要件:\n\
                 1. 人物を具体的に特定\n\
                 2. 役割や立場も含める\n\
                 3. 関係する人物の情報も記載\n"
            }
            Self::What => {
                "回答の要件:\n\
                 1. 対象を具体的に説明\n\
                 2. 特徴や性質を記載\n\
                 3. 関連する情報も含める\n"
            }
            Self::How => {
                "回答の要件:\n\
                 1. 手順や方法を具体的に説明\n\
                 2. 順序立てて記載\n\
                 3. 重要なポイントを強調\n"
            }
            Self::Why => {
                "回答の要件:\n\
                 1. 理由や原因を具体的に説明\n\
                 2. 背景情報も含める\n\
                 3. 論理的な繋がりを示す\n"
            }
            Self::General => {
                "回答の要件:\n\
                 1. 質問の意図に沿った情報を提供\n\
                 2. 具体的な事実を中心に説明\n\
                 3. 関連する重要情報も含める\n"
            }
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ANSWER_FORMAT: &str = "\nフォーマット:\n\
[送信] YYYY年MM月DD日 HH:MM\n\
\n\
内容：\n\
（ここに回答の本文）\n\
\n\
補足：\n\
（必要な場合のみ補足情報を記載）\n";

/// One `[local time] text` entry per message, followed by its attachment
/// list. Messages with neither text nor files are skipped.
#[must_use]
pub fn build_context(messages: &[CandidateMessage]) -> String {
    messages
        .iter()
        .filter_map(|m| {
            let text = m.text.trim();
            if text.is_empty() && m.files.is_empty() {
                return None;
            }
            let text = if text.is_empty() { "本文なし" } else { text };
            let mut entry = format!("[{}] {text}", m.local_time());
            let files = format_file_attachments(&m.files);
            if !files.is_empty() {
                entry.push('\n');
                entry.push_str(&files);
            }
            Some(entry)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn answer_prompt(query: &str, context: &str, kind: QuestionType) -> String {
    format!(
        "質問: {query}\n\n以下の情報を元に、質問に対する回答を生成してください：\n\n{context}\n\n{}{ANSWER_FORMAT}",
        kind.requirements()
    )
}

#[must_use]
pub fn quality_prompt(answer: &str, query: &str, kind: QuestionType) -> String {
    format!(
        r"Evaluate the quality of this answer for a {kind} question:
Question: {query}
Answer: {answer}

Consider the question type '{kind}' when evaluating.
Return a JSON object with the following properties:
- has_direct_answer: Does it directly address the {kind} aspect? (boolean)
- has_specific_info: Does it contain specific details? (boolean)
- has_time_info: Does it include temporal information? (boolean)
- is_relevant: Is it relevant to the question? (boolean)
- confidence_score: A float between 0 and 1 indicating confidence

Return only the JSON object, no explanation."
    )
}

/// Answer assembled from the newest message alone.
#[must_use]
pub fn fallback_answer(message: &CandidateMessage) -> String {
    format!(
        "[送信] {}\n\n内容：\n{}\n\n補足：\nこの情報は、入力された質問に最も関連性の高いものとして検出されました。",
        message.local_time(),
        message.text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use slackqa_core::FileAttachment;

    #[test]
    fn first_matching_category_wins() {
        assert_eq!(QuestionType::classify("会議はどこで何時から？"), QuestionType::Location);
        assert_eq!(QuestionType::classify("締め切りはいつ？"), QuestionType::Time);
        assert_eq!(QuestionType::classify("担当は誰ですか"), QuestionType::Who);
        assert_eq!(QuestionType::classify("どんな資料？"), QuestionType::What);
        assert_eq!(QuestionType::classify("どうすれば申請できる？"), QuestionType::How);
        assert_eq!(QuestionType::classify("延期の理由は"), QuestionType::Why);
        assert_eq!(QuestionType::classify("研修について"), QuestionType::General);
    }

    #[test]
    fn context_skips_empty_messages() {
        let messages = vec![
            CandidateMessage::new("1700000000.0", " 研修は月曜 "),
            CandidateMessage::new("1700000001.0", "   "),
            CandidateMessage::new("bogus", "会議"),
        ];
        let context = build_context(&messages);
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] 研修は月曜"));
        assert_eq!(lines[1], "[不明な時刻] 会議");
    }

    #[test]
    fn context_lists_attachments() {
        let mut with_file = CandidateMessage::new("bogus", "議事録です");
        with_file.files.push(FileAttachment {
            name: "minutes.pdf".to_string(),
            filetype: "pdf".to_string(),
            size: 1536,
        });
        let mut file_only = CandidateMessage::new("bogus", " ");
        file_only.files = with_file.files.clone();

        let context = build_context(&[with_file, file_only]);
        assert_eq!(
            context,
            "[不明な時刻] 議事録です\n添付ファイル:\n- minutes.pdf (pdf, 1.5KB)\n\
             [不明な時刻] 本文なし\n添付ファイル:\n- minutes.pdf (pdf, 1.5KB)"
        );
    }

    #[test]
    fn prompts_carry_type_specific_text() {
        let prompt = answer_prompt("誰が担当？", "[t] x", QuestionType::Who);
        assert!(prompt.contains("人物を具体的に特定"));
        assert!(prompt.contains("[送信] YYYY年MM月DD日 HH:MM"));

        let eval = quality_prompt("a", "q", QuestionType::Time);
        assert!(eval.contains("for a time question"));
    }

    #[test]
    fn fallback_quotes_the_message() {
        let answer = fallback_answer(&CandidateMessage::new("bogus", " 本文 "));
        assert!(answer.starts_with("[送信] 不明な時刻"));
        assert!(answer.contains("内容：\n本文\n"));
    }
}
