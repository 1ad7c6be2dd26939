//! Defensive extraction of JSON from free-form generative replies.
//!
//! The upstream model is not contractually obligated to return valid JSON,
//! so extraction runs an ordered chain of recovery strategies and the first
//! successful parse wins:
//!
//! 1. Strip markdown code fences and parse directly.
//! 2. Parse the first balanced `{...}` span found in the text.
//! 3. Apply textual repairs (trailing commas, bare keys, single-quoted and
//!    unquoted values) and parse again.
//!
//! Already-valid input never reaches a repair strategy, so extraction is
//! exact on clean replies.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object found in response: {0}")]
    NoJson(String),

    #[error("response could not be parsed as JSON after repair: {0}")]
    Unparseable(String),
}

static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("invalid code fence regex"));

/// `,}` or `,]` with optional whitespace.
static TRAILING_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("invalid trailing comma regex"));

/// Bare object keys: `word:` not already inside quotes.
static BARE_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#).expect("invalid bare key regex")
});

/// Single-quoted string values: `: 'text'`.
static SINGLE_QUOTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#":\s*'([^']*)'"#).expect("invalid single quote regex"));

/// Unquoted scalar values that are not numbers, booleans, or null.
static BARE_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":\s*([A-Za-z][^",\{\}\[\]]*[^",\{\}\[\]\s])"#).expect("invalid bare value regex")
});

/// Extract a JSON value from a raw model reply.
///
/// Fails with [`ExtractError`] only after every recovery strategy has been
/// tried. On clean input the result is byte-for-byte what `serde_json`
/// would have parsed.
pub fn extract_json(raw: &str) -> Result<Value, ExtractError> {
    let cleaned = strip_code_fences(raw);

    // Strategy 1: direct parse.
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok(value);
    }

    // Strategy 2: first balanced {...} span.
    if let Some(span) = balanced_object_span(&cleaned) {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(value);
        }
    }

    // Strategy 3: textual repair, then reparse.
    let repaired = repair_json(&cleaned);
    serde_json::from_str(&repaired).map_err(|e| {
        tracing::warn!(error = %e, "all extraction strategies failed");
        ExtractError::Unparseable(truncate(raw, 200))
    })
}

/// Extract a JSON object (map) from a raw model reply, rejecting
/// top-level scalars and arrays.
pub fn extract_object(raw: &str) -> Result<Value, ExtractError> {
    let value = extract_json(raw)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ExtractError::NoJson(truncate(raw, 200)))
    }
}

/// Remove markdown code fences (```json ... ```) from the reply.
fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE_REGEX.replace_all(raw, "").trim().to_string()
}

/// Find the first balanced `{...}` span, honoring strings and escapes.
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Apply the textual repair sequence to almost-JSON text.
fn repair_json(text: &str) -> String {
    let fixed = TRAILING_COMMA_REGEX.replace_all(text, "$1");
    let fixed = BARE_KEY_REGEX.replace_all(&fixed, "$1\"$2\":");
    let fixed = SINGLE_QUOTE_REGEX.replace_all(&fixed, ": \"$1\"");
    let fixed = BARE_VALUE_REGEX.replace_all(&fixed, |caps: &regex::Captures| {
        let value = caps[1].trim();
        // Leave valid JSON literals alone.
        if matches!(value, "true" | "false" | "null") {
            format!(": {value}")
        } else {
            format!(": \"{value}\"")
        }
    });
    fixed.into_owned()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
