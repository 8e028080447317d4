//! Recovery of JSON values from raw provider text.
//!
//! Providers are told to answer with bare JSON and frequently don't: the
//! value arrives wrapped in prose or markdown fences, sprinkled with
//! zero-width characters, or with raw newlines inside string literals.
//! [`extract_json`] undoes that damage in three passes:
//!
//! 1. [`strip_invisible`] drops BOMs, zero-width characters and control
//!    characters (`\n`, `\r`, `\t` survive for pass 3).
//! 2. A string-aware scanner finds the first balanced `{...}` or `[...]`
//!    span that parses.
//! 3. [`escape_raw_whitespace`] escapes raw newlines/tabs that occur inside
//!    string literals. Existing escape sequences are copied verbatim, so
//!    the pass is idempotent.
//!
//! Nothing is ever invented: if no span parses, the result is
//! [`HuginnError::NoJsonFound`].

use crate::{HuginnError, Result};

/// A JSON value recovered from provider output.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSlice {
    text: String,
    value: serde_json::Value,
}

impl JsonSlice {
    /// The repaired JSON text of the span.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn into_value(self) -> serde_json::Value {
        self.value
    }
}

/// Extract the first well-formed JSON object or array from `raw`.
pub fn extract_json(raw: &str) -> Result<JsonSlice> {
    let cleaned = strip_invisible(raw);
    let chars: Vec<char> = cleaned.chars().collect();

    let mut from = 0;
    while let Some(start) = find_opener(&chars, from) {
        match find_balanced_end(&chars, start) {
            Some(end) => {
                let span: String = chars[start..=end].iter().collect();
                let text = escape_raw_whitespace(&span);
                if let Ok(value) = serde_json::from_str(&text) {
                    return Ok(JsonSlice { text, value });
                }
                // Balanced but broken: don't return fragments nested inside it.
                from = end + 1;
            }
            None => from = start + 1,
        }
    }
    Err(HuginnError::NoJsonFound)
}

/// Remove characters that break strict JSON parsers.
///
/// Drops U+FEFF, zero-width characters and C0/C1 controls, keeping
/// `\n`, `\r` and `\t`.
pub fn strip_invisible(raw: &str) -> String {
    raw.chars().filter(|c| !is_invisible(*c)).collect()
}

fn is_invisible(c: char) -> bool {
    match c {
        '\n' | '\r' | '\t' => false,
        '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}' => true,
        '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' => true,
        _ => false,
    }
}

/// Escape raw `\n`, `\r` and `\t` that appear inside string literals.
pub fn escape_raw_whitespace(span: &str) -> String {
    let mut out = String::with_capacity(span.len());
    let mut in_string = false;
    let mut chars = span.chars();

    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn find_opener(chars: &[char], from: usize) -> Option<usize> {
    chars
        .iter()
        .skip(from)
        .position(|c| matches!(c, '{' | '['))
        .map(|i| i + from)
}

/// Index of the bracket closing the one at `start`, tracking strings.
///
/// Returns `None` when the input ends first or a closer doesn't match.
fn find_balanced_end(chars: &[char], start: usize) -> Option<usize> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
