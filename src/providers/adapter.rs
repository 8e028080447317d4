//! Timeout-bounded provider attempts.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{info, warn};

use super::traits::GenerateProvider;
use crate::telemetry;
use crate::types::ProviderDescriptor;
use crate::{HuginnError, Result};

/// One entry of the fallback chain: a descriptor bound to its transport.
///
/// The adapter owns the per-attempt deadline and the per-attempt
/// observability record; it holds no state between calls.
#[derive(Clone)]
pub struct ProviderAdapter {
    descriptor: ProviderDescriptor,
    provider: Arc<dyn GenerateProvider>,
}

impl ProviderAdapter {
    pub fn new(descriptor: ProviderDescriptor, provider: Arc<dyn GenerateProvider>) -> Self {
        Self {
            descriptor,
            provider,
        }
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// Descriptor name; this is what logs, metrics and results report.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Run one attempt, bounded by the descriptor's timeout.
    ///
    /// Returns the raw text body. `cache_key` is the request fingerprint,
    /// carried only into the attempt record.
    pub async fn generate(&self, prompt: &str, cache_key: &str) -> Result<String> {
        self.generate_until(prompt, cache_key, None).await
    }

    /// Run one attempt, bounded by the descriptor's timeout and by
    /// `deadline` when given, whichever comes first.
    ///
    /// An attempt cut short by either bound is reported as `Timeout` and
    /// still produces its attempt record.
    pub async fn generate_until(
        &self,
        prompt: &str,
        cache_key: &str,
        deadline: Option<Instant>,
    ) -> Result<String> {
        let start = Instant::now();
        let own = start.checked_add(self.descriptor.timeout);
        let until = match (own, deadline) {
            (Some(own), Some(deadline)) => Some(own.min(deadline)),
            (own, deadline) => own.or(deadline),
        };
        let options = self.descriptor.options();
        let call = self.provider.generate(prompt, &options);
        let result = match until {
            Some(until) => match tokio::time::timeout_at(until, call).await {
                Ok(result) => result,
                Err(_) => Err(HuginnError::Timeout(start.elapsed())),
            },
            None => call.await,
        };
        self.record_attempt(start, &result, cache_key);
        result
    }

    fn record_attempt(&self, start: Instant, result: &Result<String>, cache_key: &str) {
        let elapsed = start.elapsed();
        let outcome = match result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        metrics::counter!(telemetry::PROVIDER_ATTEMPTS_TOTAL,
            "provider" => self.descriptor.name.clone(),
            "outcome" => outcome,
        )
        .increment(1);
        metrics::histogram!(telemetry::PROVIDER_ATTEMPT_DURATION_SECONDS,
            "provider" => self.descriptor.name.clone(),
        )
        .record(elapsed.as_secs_f64());

        let latency_ms = elapsed.as_millis() as u64;
        match result {
            Ok(text) => info!(
                provider = %self.descriptor.name,
                outcome,
                latency_ms,
                cache_key,
                bytes = text.len(),
                "provider attempt"
            ),
            Err(e) => warn!(
                provider = %self.descriptor.name,
                outcome,
                latency_ms,
                cache_key,
                error = %e,
                "provider attempt"
            ),
        }
    }
}
