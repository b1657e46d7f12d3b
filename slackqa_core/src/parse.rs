//! Tolerant extraction of JSON literals from free-form model output.
//!
//! Language models wrap their answers in prose, code fences or several
//! candidate literals. These helpers scan the text for the first balanced
//! literal of the requested shape that also decodes into the target type.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no {0} literal found in response")]
    NotFound(&'static str),

    #[error("{0} literal is not terminated")]
    Truncated(&'static str),

    #[error("{kind} literal could not be decoded: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Extract the first JSON array in `text` that decodes as `Vec<T>`.
pub fn extract_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ParseError> {
    extract_literal(text, '[', ']', "array")
}

/// Extract the first JSON object in `text` that decodes as `T`.
pub fn extract_object<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    extract_literal(text, '{', '}', "object")
}

fn extract_literal<T: DeserializeOwned>(
    text: &str,
    open: char,
    close: char,
    kind: &'static str,
) -> Result<T, ParseError> {
    let mut last_error = None;
    let mut saw_open = false;

    for (start, _) in text.match_indices(open) {
        saw_open = true;
        let Some(end) = balanced_end(text, start, open, close) else {
            continue;
        };
        match serde_json::from_str::<T>(&text[start..end]) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(source) => Err(ParseError::Malformed { kind, source }),
        None if saw_open => Err(ParseError::Truncated(kind)),
        None => Err(ParseError::NotFound(kind)),
    }
}

/// Byte offset one past the bracket closing the one at `start`.
fn balanced_end(text: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0_i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
