//! Deterministic fallback content.
//!
//! When every provider fails, the orchestrator still answers: it asks the
//! request's [`ContentKind`](crate::kinds::ContentKind) to synthesize a
//! schema-valid placeholder from the request parameters alone.
//!
//! Synthesis is total and performs no I/O. It is also deterministic across
//! processes: wherever a kind wants "variety" (which template, which names)
//! it selects with [`pick_index`], an xxh3 hash of a seed string modulo the
//! table size. Seeds come from [`canonical_parameters`], so requests that
//! differ only in list order or surrounding whitespace synthesize
//! byte-identical output.

use xxhash_rust::xxh3::xxh3_64;

use crate::types::{GenerationRequest, Parameters, canonical_parameters};

/// Builds placeholder content for one content kind.
///
/// Implementations must be pure: same parameters, same value, and the
/// value must satisfy the kind's schema.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, parameters: &Parameters) -> serde_json::Value;
}

/// Synthesize fallback content for `request`.
pub fn synthesize(request: &GenerationRequest) -> serde_json::Value {
    request.kind().synthesize(request.parameters())
}

/// Deterministic index into a table of `len` items. Returns 0 for empty tables.
pub fn pick_index(len: usize, seed: &str) -> usize {
    if len == 0 {
        return 0;
    }
    (xxh3_64(seed.as_bytes()) % len as u64) as usize
}

/// Seed for [`pick_index`] derived from all parameters plus a salt, so
/// different choices within one synthesis don't move in lockstep.
pub fn seed(parameters: &Parameters, salt: &str) -> String {
    format!("{salt}:{}", canonical_parameters(parameters))
}

/// Lowercased, trimmed text with internal whitespace collapsed.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized text of parameter `name`, if present and non-empty.
///
/// For list parameters this is the first item after sorting.
pub fn primary_text(parameters: &Parameters, name: &str) -> Option<String> {
    sorted_texts(parameters, name).into_iter().next()
}

/// Normalized, sorted, de-duplicated text items of parameter `name`.
pub fn sorted_texts(parameters: &Parameters, name: &str) -> Vec<String> {
    let mut texts: Vec<String> = parameters
        .get(name)
        .map(|value| value.texts())
        .unwrap_or_default()
        .into_iter()
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect();
    texts.sort();
    texts.dedup();
    texts
}

/// Raw (trimmed, original case) text of parameter `name`, for display.
pub fn display_text(parameters: &Parameters, name: &str) -> Option<String> {
    parameters
        .get(name)
        .and_then(|value| value.as_text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Replace `{key}` placeholders in `template`.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}
