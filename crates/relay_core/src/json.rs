//! Pull JSON payloads out of free-form model output.
//!
//! Models often wrap JSON in markdown fences, annotate it with `//` comments
//! or leave trailing commas behind. These helpers recover a parseable payload.

use regex::Regex;
use std::sync::LazyLock;

static OBJECT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*\n?(\{.*\})\s*```").expect("Valid object block regex")
});
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Valid object span regex"));
static ARRAY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*\n?(\[.*\])\s*```").expect("Valid array block regex")
});
static ARRAY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("Valid array span regex"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("Valid trailing comma regex"));

/// Extract a JSON object from model output.
///
/// Fenced code blocks win over bare braces. Returns an empty string when no
/// object is present.
///
/// # Examples
///
/// ```
/// use relay_core::extract_json;
///
/// let text = "Here you go:\n```json\n{\"goal\": \"ship\",}\n```\nThanks!";
/// let json = extract_json(text);
/// let value: serde_json::Value = serde_json::from_str(&json).unwrap();
/// assert_eq!(value["goal"], "ship");
/// ```
pub fn extract_json(content: &str) -> String {
    extract_with(content, &OBJECT_BLOCK, &OBJECT_SPAN)
}

/// Extract a JSON array from model output.
pub fn extract_json_array(content: &str) -> String {
    extract_with(content, &ARRAY_BLOCK, &ARRAY_SPAN)
}

fn extract_with(content: &str, block: &Regex, span: &Regex) -> String {
    let raw = block
        .captures(content)
        .and_then(|captures| captures.get(1))
        .or_else(|| span.find(content));
    match raw {
        Some(found) => clean_json(found.as_str()),
        None => String::new(),
    }
}

fn clean_json(raw: &str) -> String {
    let stripped = raw
        .lines()
        .map(strip_line_comment)
        .collect::<Vec<_>>()
        .join("\n");
    TRAILING_COMMA.replace_all(&stripped, "$1").into_owned()
}

/// Remove a `//` comment that sits outside any string literal.
fn strip_line_comment(line: &str) -> &str {
    if !line.contains("//") {
        return line;
    }

    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    for (i, &byte) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => {
                return line[..i].trim_end_matches([' ', '\t']);
            }
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_inside_string_is_kept() {
        assert_eq!(
            strip_line_comment(r#""url": "http://example.com" // note"#),
            r#""url": "http://example.com""#
        );
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let line = r#""say \"hi\" // not a comment""#;
        assert_eq!(strip_line_comment(line), line);
    }
}
