//! Attempt outcomes and the orchestrator's result type.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Classified reason a provider attempt was unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The attempt exceeded its provider (or chain) deadline.
    Timeout,
    /// The provider answered with a non-success status.
    Rejected,
    /// Transport-level failure: DNS, connect, reset.
    Unreachable,
    /// No well-formed JSON could be recovered from the output.
    NoJsonFound,
    /// Recovered JSON did not match the expected shape.
    SchemaViolation,
}

impl FailureKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Rejected => "rejected",
            FailureKind::Unreachable => "unreachable",
            FailureKind::NoJsonFound => "no_json_found",
            FailureKind::SchemaViolation => "schema_violation",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed attempt, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub provider: String,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.provider, self.kind, self.message)
    }
}

/// Result of a single provider attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Output sanitized and validated.
    Success {
        value: serde_json::Value,
        provider: String,
        latency: Duration,
    },
    /// The attempt is unusable; the chain advances.
    Failure(AttemptFailure),
}

impl GenerationOutcome {
    /// Provider that produced this outcome.
    pub fn provider(&self) -> &str {
        match self {
            GenerationOutcome::Success { provider, .. } => provider,
            GenerationOutcome::Failure(f) => &f.provider,
        }
    }

    /// Metrics/log label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationOutcome::Success { .. } => "success",
            GenerationOutcome::Failure(f) => f.kind.as_str(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }
}

/// Value returned by [`Orchestrator::generate`](crate::Orchestrator::generate).
///
/// `fallback` is always present: `true` means every provider failed and
/// `value` was synthesized locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generated {
    pub value: serde_json::Value,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl Generated {
    /// A value produced by a provider.
    pub fn from_provider(value: serde_json::Value, provider: impl Into<String>) -> Self {
        Self {
            value,
            fallback: false,
            provider: Some(provider.into()),
        }
    }

    /// A value synthesized without any provider.
    pub fn synthesized(value: serde_json::Value) -> Self {
        Self {
            value,
            fallback: true,
            provider: None,
        }
    }

    /// Label used for the orchestrator's final outcome.
    pub fn outcome_label(&self) -> &'static str {
        if self.fallback {
            "fallback_synthesized"
        } else {
            "success"
        }
    }

    /// Deserialize the validated value into a caller-defined type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(T::deserialize(&self.value)?)
    }
}
