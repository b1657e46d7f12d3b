//! Slack mrkdwn cleanup shared by retrieval and output formatting.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    user_mention: Regex,
    channel_ref: Regex,
    link: Regex,
    special: Regex,
    user_style: Regex,
    url: Regex,
}

#[expect(clippy::expect_used, reason = "Static regex pattern validated at compile time")]
fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        user_mention: Regex::new(r"<@[A-Z0-9]+>").expect("valid regex"),
        channel_ref: Regex::new(r"<#[A-Z0-9]+\|[^>]+>").expect("valid regex"),
        link: Regex::new(r"<http[^>]+>").expect("valid regex"),
        special: Regex::new(r"<![^>]+>").expect("valid regex"),
        user_style: Regex::new(r"(?s)<userStyle>.*?</userStyle>").expect("valid regex"),
        url: Regex::new(r"<(https?://[^>|]+)(?:\|[^>]*)?>").expect("valid regex"),
    })
}

/// Strip mentions, channel references, links, `<!…>` specials and
/// `<userStyle>` blocks, then trim.
#[must_use]
pub fn clean_slack_message(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let p = patterns();
    let text = p.user_mention.replace_all(text, "");
    let text = p.channel_ref.replace_all(&text, "");
    let text = p.link.replace_all(&text, "");
    let text = p.special.replace_all(&text, "");
    let text = p.user_style.replace_all(&text, "");
    text.trim().to_string()
}

/// Remove only user mentions; used on inbound bot mentions.
#[must_use]
pub fn strip_mentions(text: &str) -> String {
    patterns().user_mention.replace_all(text, "").trim().to_string()
}

/// URLs wrapped in `<…>`, label suffix dropped.
#[must_use]
pub fn extract_links(text: &str) -> Vec<String> {
    patterns()
        .url
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_every_markup_kind() {
        let raw = "<@U123ABC> see <#C999|general> and <https://example.com|docs> <!here> \
                   <userStyle>bold</userStyle>研修の日程";
        let cleaned = clean_slack_message(raw);
        assert!(cleaned.starts_with("see"));
        assert!(cleaned.ends_with("研修の日程"));
        assert!(!cleaned.contains('<'));
        assert!(!cleaned.contains("bold"));
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_slack_message(""), "");
    }

    #[test]
    fn mention_stripping_keeps_links() {
        assert_eq!(
            strip_mentions("<@UBOT> <https://a.example> 会議は？"),
            "<https://a.example> 会議は？"
        );
    }

    #[test]
    fn links_are_extracted_without_labels() {
        let links = extract_links("a <https://a.example/x|label> b <http://b.example> <@U1>");
        assert_eq!(links, vec!["https://a.example/x", "http://b.example"]);
    }
}
