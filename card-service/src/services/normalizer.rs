//! Cleanup of raw model replies into JSON.
//!
//! Models often wrap their answer in a Markdown code fence even when told
//! not to. The fence is removed and the rest is parsed as-is; the shape of
//! the resulting document is not checked.

use serde_json::Value;
use thiserror::Error;

const FENCE: &str = "```";

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Failed to parse JSON response from model: {source}")]
    Malformed {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl NormalizeError {
    /// The unmodified model text, for diagnostics.
    pub fn raw(&self) -> &str {
        match self {
            NormalizeError::Malformed { raw, .. } => raw,
        }
    }
}

/// Strip whitespace and an optional surrounding code fence, then parse.
pub fn normalize(raw: &str) -> Result<Value, NormalizeError> {
    let text = strip_code_fence(raw.trim());

    serde_json::from_str(text).map_err(|source| NormalizeError::Malformed {
        raw: raw.to_string(),
        source,
    })
}

/// Remove a leading ```` ``` ```` (with an optional language tag such as
/// `json` on the same line) and a trailing ```` ``` ````.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };

    // A tag only counts when a newline ends it, so ```42``` keeps its body.
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(is_tag_char) => body,
        _ => rest,
    };

    let rest = rest.strip_suffix(FENCE).unwrap_or(rest);
    rest.trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
