//! Ordered fallback chain over provider adapters.
//!
//! The `FallbackChain` stores adapters in priority order (index 0 = tried
//! first). Order encodes a deliberate cost/latency/quality trade-off, so the
//! chain never reorders and never races providers: the result comes from
//! the first provider to *succeed*, not the first to respond.
//!
//! # Fallback Triggers
//!
//! Every failure advances the chain:
//! - transport failures from the adapter (`Timeout`, `Rejected`, `Unreachable`)
//! - output with no recoverable JSON (`NoJsonFound`)
//! - JSON that doesn't match the kind's schema (`SchemaViolation`)
//!
//! # Fallback Chain Flow
//!
//! ```text
//! orchestrator: chain.run(prompt, schema, key)
//!                     │
//!                     ▼
//!         ┌─────────────────────┐
//!         │  fast (priority 0)  │ ──► raw text ──► extract_json ──► validate
//!         └─────────┬───────────┘
//!                   │ any failure: record, advance
//!                   ▼
//!         ┌─────────────────────┐
//!         │  slow (priority 1)  │ ──► raw text ──► extract_json ──► validate ──► Ok
//!         └─────────────────────┘
//! ```
//!
//! # Deadline
//!
//! An optional chain-wide deadline bounds the whole run. When it expires
//! mid-attempt, that attempt is recorded as `Timeout` and the chain stops
//! without trying the remaining providers.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::providers::ProviderAdapter;
use crate::sanitize::extract_json;
use crate::schema::{Schema, validate};
use crate::telemetry;
use crate::types::{AttemptFailure, FailureKind, GenerationOutcome};
use crate::Result;

/// First provider output that sanitized and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSuccess {
    pub value: serde_json::Value,
    pub provider: String,
    /// Latency of the successful attempt alone.
    pub latency: Duration,
    /// Failures recorded before the success.
    pub failures: Vec<AttemptFailure>,
}

/// Every provider failed (or the deadline cut the chain short).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("fallback chain exhausted after {} attempt(s)", attempts.len())]
pub struct ChainFailure {
    pub attempts: Vec<AttemptFailure>,
}

impl ChainFailure {
    /// Whether any attempt failed with `kind`.
    pub fn contains(&self, kind: FailureKind) -> bool {
        self.attempts.iter().any(|a| a.kind == kind)
    }
}

/// Ordered list of provider adapters with fallback semantics.
#[derive(Clone, Default)]
pub struct FallbackChain {
    adapters: Vec<ProviderAdapter>,
    deadline: Option<Duration>,
}

impl FallbackChain {
    /// Create an empty chain with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter (appended to end = lowest priority).
    pub fn push(&mut self, adapter: ProviderAdapter) {
        self.adapters.push(adapter);
    }

    /// Set or clear the chain-wide deadline.
    pub fn set_deadline(&mut self, deadline: Option<Duration>) {
        self.deadline = deadline;
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.adapters.iter().map(ProviderAdapter::name).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Try each provider in order until one yields schema-valid JSON.
    ///
    /// `cache_key` is the request fingerprint, used only for telemetry.
    #[instrument(skip(self, prompt, schema), fields(providers = self.adapters.len()))]
    pub async fn run(
        &self,
        prompt: &str,
        schema: &Schema,
        cache_key: &str,
    ) -> std::result::Result<ChainSuccess, ChainFailure> {
        let deadline = self.deadline.and_then(|d| Instant::now().checked_add(d));
        let mut failures = Vec::new();

        for adapter in &self.adapters {
            let outcome = self.attempt(adapter, prompt, schema, cache_key, deadline).await;
            match outcome {
                GenerationOutcome::Success {
                    value,
                    provider,
                    latency,
                } => {
                    return Ok(ChainSuccess {
                        value,
                        provider,
                        latency,
                        failures,
                    });
                }
                GenerationOutcome::Failure(failure) => {
                    debug!(
                        provider = %failure.provider,
                        kind = %failure.kind,
                        "advancing fallback chain"
                    );
                    failures.push(failure);
                    if deadline.is_some_and(|at| Instant::now() >= at) {
                        warn!(provider = adapter.name(), "chain deadline exceeded");
                        break;
                    }
                }
            }
        }

        metrics::counter!(telemetry::CHAIN_EXHAUSTED_TOTAL).increment(1);
        Err(ChainFailure { attempts: failures })
    }

    /// One provider attempt: generate, sanitize, validate.
    async fn attempt(
        &self,
        adapter: &ProviderAdapter,
        prompt: &str,
        schema: &Schema,
        cache_key: &str,
        deadline: Option<Instant>,
    ) -> GenerationOutcome {
        let start = Instant::now();
        let result = match adapter.generate_until(prompt, cache_key, deadline).await {
            Ok(raw) => Self::recover(&raw, schema).inspect_err(|e| {
                metrics::counter!(telemetry::OUTPUT_REJECTIONS_TOTAL,
                    "provider" => adapter.name().to_owned(),
                    "reason" => e.kind().as_str(),
                )
                .increment(1);
                warn!(provider = adapter.name(), error = %e, "discarding provider output");
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => GenerationOutcome::Success {
                value,
                provider: adapter.name().to_string(),
                latency: start.elapsed(),
            },
            Err(e) => GenerationOutcome::Failure(AttemptFailure {
                provider: adapter.name().to_string(),
                kind: e.kind(),
                message: e.to_string(),
            }),
        }
    }

    /// Sanitize raw text and validate it against `schema`.
    fn recover(raw: &str, schema: &Schema) -> Result<serde_json::Value> {
        let slice = extract_json(raw)?;
        Ok(validate(slice.into_value(), schema)?)
    }
}
