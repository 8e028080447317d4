//! Generation requests and the cache keys derived from them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::kinds::ContentKind;

/// A primitive or list request parameter (e.g. `subject`, `interests`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
}

/// Ordered request parameters.
pub type Parameters = BTreeMap<String, ParamValue>;

impl ParamValue {
    /// The text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Every text value: the value itself, or the text items of a list.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            ParamValue::Text(s) => vec![s.as_str()],
            ParamValue::List(items) => items.iter().filter_map(ParamValue::as_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Normalized form used for cache keys.
    ///
    /// Text is trimmed and lists are sorted, so `["b", "a "]` and
    /// `["a", "b"]` normalize to the same value.
    pub fn normalized(&self) -> ParamValue {
        match self {
            ParamValue::Text(s) => ParamValue::Text(s.trim().to_string()),
            ParamValue::List(items) => {
                let mut items: Vec<ParamValue> = items.iter().map(ParamValue::normalized).collect();
                items.sort_by_cached_key(ParamValue::sort_key);
                ParamValue::List(items)
            }
            other => other.clone(),
        }
    }

    fn sort_key(&self) -> String {
        // Plain values always serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Stable cache key: kind name plus normalized parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Canonical serialized form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 64-bit xxh3 digest of the canonical form, stable across processes.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(self.0.as_bytes())
    }

    /// Fingerprint as fixed-width hex, as it appears in logs.
    pub fn fingerprint_hex(&self) -> String {
        format!("{:016x}", self.fingerprint())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct KeyRepr<'a> {
    kind: &'a str,
    parameters: BTreeMap<&'a str, ParamValue>,
}

fn normalized_parameters(parameters: &Parameters) -> BTreeMap<&str, ParamValue> {
    parameters
        .iter()
        .map(|(k, v)| (k.as_str(), v.normalized()))
        .collect()
}

/// Canonical JSON of normalized parameters.
///
/// Identical for parameter maps that differ only in list order or
/// surrounding whitespace.
pub fn canonical_parameters(parameters: &Parameters) -> String {
    // String-keyed maps of plain values always serialize.
    serde_json::to_string(&normalized_parameters(parameters)).unwrap_or_default()
}

/// One inbound content-generation request.
///
/// Built once, then read-only: there are no setters after construction,
/// so the derived [`CacheKey`] is stable for the request's lifetime.
///
/// ```rust
/// # use huginn::kinds;
/// # use huginn::GenerationRequest;
/// let request = GenerationRequest::new(kinds::practice_question(), "Write one question...")
///     .param("subject", "math")
///     .param("interests", vec!["soccer"])
///     .param("gradeLevel", "6th");
/// assert_eq!(request.kind().name(), "practice_question");
/// ```
#[derive(Clone)]
pub struct GenerationRequest {
    kind: Arc<ContentKind>,
    parameters: Parameters,
    prompt: String,
}

impl GenerationRequest {
    /// Start a request for `kind` with a fully rendered prompt.
    pub fn new(kind: Arc<ContentKind>, prompt: impl Into<String>) -> Self {
        Self::with_parameters(kind, Parameters::new(), prompt)
    }

    /// Create a request with a prepared parameter map.
    pub fn with_parameters(
        kind: Arc<ContentKind>,
        parameters: Parameters,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            parameters,
            prompt: prompt.into(),
        }
    }

    /// Add a parameter while building the request.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn kind(&self) -> &Arc<ContentKind> {
        &self.kind
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Derive the cache key. The prompt is not part of the key.
    pub fn cache_key(&self) -> CacheKey {
        let repr = KeyRepr {
            kind: self.kind.name(),
            parameters: normalized_parameters(&self.parameters),
        };
        CacheKey(serde_json::to_string(&repr).unwrap_or_default())
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("kind", &self.kind.name())
            .field("parameters", &self.parameters)
            .field("prompt_len", &self.prompt.len())
            .finish()
    }
}
