//! Tolerant JSON extraction from unstructured completion output
//!
//! The completion service is not contractually bound to emit clean JSON: it
//! may wrap the payload in markdown fencing, prefix it with prose, or return
//! something unparsable altogether. Extraction is layered, cheapest first:
//!
//! 1. direct decode of the trimmed text
//! 2. first fenced block (``` or ~~~), then the same block with a leading
//!    language-tag line stripped, then the first balanced object inside it
//! 3. first top-level balanced `{...}` substring of the whole text, tracking
//!    string-quote and escape state so braces inside strings don't count
//!
//! [`parse_or`] never fails; callers supply the fallback value.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extracts the first JSON value found in `raw`, or `None`.
pub fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(value) = try_decode(trimmed) {
        return Some(value);
    }

    if let Some(block) = fenced_block(trimmed) {
        let block = block.trim();
        if let Some(value) = try_decode(block) {
            return Some(value);
        }
        if let Some(rest) = strip_language_line(block) {
            if let Some(value) = try_decode(rest.trim()) {
                return Some(value);
            }
        }
        if let Some(candidate) = first_balanced_object(block) {
            if let Some(value) = try_decode(candidate) {
                return Some(value);
            }
        }
    }

    first_balanced_object(trimmed).and_then(try_decode)
}

/// Decodes `raw` into `T`, returning `fallback` when nothing usable is found.
///
/// This is the only entry point stage agents use; it cannot fail or panic.
pub fn parse_or<T: DeserializeOwned>(raw: &str, fallback: T) -> T {
    match extract_json(raw) {
        Some(value) => serde_json::from_value(value).unwrap_or(fallback),
        None => fallback,
    }
}

fn try_decode(s: &str) -> Option<Value> {
    serde_json::from_str(s).ok()
}

/// Byte offset of the earliest fence marker (``` or ~~~), if any.
fn earliest_marker(s: &str) -> Option<usize> {
    match (s.find("```"), s.find("~~~")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Content of the first fenced block. The opening marker line (which may
/// carry a language tag) runs to the first newline; the block ends at the
/// next fence marker of either kind.
fn fenced_block(s: &str) -> Option<&str> {
    let open = earliest_marker(s)?;
    let after = &s[open + 3..];
    let newline = after.find('\n')?;
    let body = &after[newline + 1..];
    let close = earliest_marker(body)?;
    Some(&body[..close])
}

/// Drops a leading `json` / `javascript` tag line that some models leave
/// inside the fence itself.
fn strip_language_line(block: &str) -> Option<&str> {
    let newline = block.find('\n')?;
    let first = block[..newline].trim();
    if first.eq_ignore_ascii_case("json") || first.eq_ignore_ascii_case("javascript") {
        Some(&block[newline + 1..])
    } else {
        None
    }
}

/// First top-level balanced `{...}` substring, quote- and escape-aware.
fn first_balanced_object(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        return start.map(|st| &s[st..i + 1]);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_decode() {
        let value = extract_json(r#"{"fraud_score": 0.4}"#).unwrap();
        assert_eq!(value, json!({"fraud_score": 0.4}));
    }

    #[test]
    fn fenced_with_language_tag() {
        let raw = "Here you go:\n```json\n{\"docs_ok\": true}\n```\nanything else?";
        assert_eq!(extract_json(raw).unwrap(), json!({"docs_ok": true}));
    }

    #[test]
    fn tilde_fence() {
        let raw = "~~~\n{\"a\": 1}\n~~~";
        assert_eq!(extract_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn language_line_inside_fence() {
        let raw = "```\njson\n{\"a\": 1}\n```";
        assert_eq!(extract_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn balanced_object_in_prose() {
        let raw = "The result is {\"score\": 0.9, \"note\": \"odd } brace\"} as requested.";
        assert_eq!(
            extract_json(raw).unwrap(),
            json!({"score": 0.9, "note": "odd } brace"})
        );
    }

    #[test]
    fn escaped_quotes_do_not_end_string() {
        let raw = r#"noise {"k": "a \" b"} tail"#;
        assert_eq!(extract_json(raw).unwrap(), json!({"k": "a \" b"}));
    }

    #[test]
    fn empty_and_garbage_yield_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("   ").is_none());
        assert!(extract_json("no json here { unbalanced").is_none());
    }

    #[test]
    fn parse_or_falls_back() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Score {
            value: f64,
        }
        let fallback = Score { value: 0.0 };
        let parsed: Score = parse_or("not json at all", fallback);
        assert_eq!(parsed, Score { value: 0.0 });
    }

    #[test]
    fn parse_or_prefers_extracted() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Score {
            value: f64,
        }
        let parsed: Score = parse_or("```\n{\"value\": 0.7}\n```", Score { value: 0.0 });
        assert_eq!(parsed, Score { value: 0.7 });
    }
}
