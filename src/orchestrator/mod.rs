//! The public entry point.
//!
//! [`Orchestrator::generate`] accepts a [`GenerationRequest`] and always
//! returns a [`Generated`] value:
//!
//! ```text
//! generate(request)
//!     │
//!     ▼
//! cache lookup ── hit ─────────────────────────────────────────► return
//!     │
//!     ├── in flight ── join leader ────────────────────────────► return
//!     │
//!     ▼ lead
//! fallback chain ── success ── store(success_ttl) ─────────────► return
//!     │
//!     └── exhausted ── synthesize ── store(fallback_ttl) ──────► return
//! ```
//!
//! Provider failures never reach the caller. When the whole chain fails the
//! request's content kind synthesizes a schema-valid placeholder and the
//! result carries `fallback: true`.

mod builder;

pub use builder::OrchestratorBuilder;

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::cache::{CacheOutcome, FlightError, SingleFlightCache};
use crate::chain::FallbackChain;
use crate::fallback;
use crate::schema::validate;
use crate::telemetry;
use crate::types::{CacheKey, Generated, GenerationRequest};

type ResultCache = SingleFlightCache<CacheKey, Generated, Infallible>;

struct Inner {
    chain: FallbackChain,
    cache: ResultCache,
    success_ttl: Duration,
    fallback_ttl: Duration,
}

/// Generation front door: cache, single-flight, fallback chain, synthesis.
///
/// Cloning is cheap; clones share the cache and the chain.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use huginn::{GenerationRequest, Orchestrator, ProviderDescriptor, kinds};
/// # async fn example(fast: Arc<dyn huginn::GenerateProvider>) -> huginn::Result<()> {
/// let orchestrator = Orchestrator::builder()
///     .provider(ProviderDescriptor::new("fast", "gemini-2.0-flash"), fast)
///     .build()?;
///
/// let request = GenerationRequest::new(kinds::practice_question(), "Write one question...")
///     .param("subject", "math")
///     .param("interests", vec!["soccer"]);
/// let generated = orchestrator.generate(&request).await;
/// println!("{} (fallback: {})", generated.value, generated.fallback);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    /// Create a new builder.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    fn new(
        chain: FallbackChain,
        max_entries: u64,
        success_ttl: Duration,
        fallback_ttl: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                chain,
                cache: SingleFlightCache::new(max_entries),
                success_ttl,
                fallback_ttl,
            }),
        }
    }

    /// Produce content for `request`. Never fails.
    #[instrument(skip_all, fields(kind = request.kind().name()))]
    pub async fn generate(&self, request: &GenerationRequest) -> Generated {
        let start = Instant::now();
        let key = request.cache_key();
        let fingerprint = key.fingerprint_hex();

        let inner = Arc::clone(&self.inner);
        let owned = request.clone();
        let leader_fingerprint = fingerprint.clone();
        let resolution = self
            .inner
            .cache
            .resolve_with(key, move || async move {
                Ok::<_, Infallible>(inner.compute(&owned, &leader_fingerprint).await)
            })
            .await;

        let generated = match resolution.result {
            Ok(generated) => generated,
            Err(FlightError::Failed(never)) => match never {},
            Err(FlightError::Aborted(reason)) => {
                // Leader died before publishing; answer this caller locally.
                error!(fingerprint = %fingerprint, reason = %reason, "generation task aborted");
                Generated::synthesized(fallback::synthesize(request))
            }
        };

        self.record_call(request, resolution.outcome, &generated, start, &fingerprint);
        generated
    }

    /// Drop any cached value for `request` and generate again.
    ///
    /// A computation already in flight for the same key is joined rather
    /// than duplicated.
    pub async fn refresh(&self, request: &GenerationRequest) -> Generated {
        self.inner.cache.invalidate(&request.cache_key());
        self.generate(request).await
    }

    /// Cached value for `request`, if live. Starts no work.
    pub fn cached(&self, request: &GenerationRequest) -> Option<Generated> {
        self.inner.cache.get(&request.cache_key())
    }

    /// Drop every cached value.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Keys with a computation currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.cache.in_flight()
    }

    /// Provider names in chain order.
    pub fn providers(&self) -> Vec<&str> {
        self.inner.chain.provider_names()
    }

    pub fn success_ttl(&self) -> Duration {
        self.inner.success_ttl
    }

    pub fn fallback_ttl(&self) -> Duration {
        self.inner.fallback_ttl
    }

    fn record_call(
        &self,
        request: &GenerationRequest,
        cache: CacheOutcome,
        generated: &Generated,
        start: Instant,
        fingerprint: &str,
    ) {
        let elapsed = start.elapsed();
        let kind = request.kind().name().to_owned();
        let outcome = generated.outcome_label();

        metrics::counter!(telemetry::GENERATIONS_TOTAL,
            "kind" => kind.clone(),
            "cache" => cache.as_str(),
            "outcome" => outcome,
        )
        .increment(1);
        metrics::histogram!(telemetry::GENERATION_DURATION_SECONDS,
            "kind" => kind,
            "cache" => cache.as_str(),
        )
        .record(elapsed.as_secs_f64());

        info!(
            cache = cache.as_str(),
            outcome,
            provider = generated.provider.as_deref().unwrap_or("-"),
            latency_ms = elapsed.as_millis() as u64,
            fingerprint,
            "generation complete"
        );
    }
}

impl Inner {
    /// Leader work: run the chain, or synthesize when it is exhausted.
    /// Returns the value together with the TTL it should be cached for.
    async fn compute(&self, request: &GenerationRequest, fingerprint: &str) -> (Generated, Duration) {
        let kind = request.kind();
        match self.chain.run(request.prompt(), kind.schema(), fingerprint).await {
            Ok(success) => (
                Generated::from_provider(success.value, success.provider),
                self.success_ttl,
            ),
            Err(failure) => {
                warn!(
                    kind = kind.name(),
                    attempts = failure.attempts.len(),
                    fingerprint,
                    "all providers failed, synthesizing fallback"
                );
                let value = fallback::synthesize(request);
                let ttl = match validate(value.clone(), kind.schema()) {
                    Ok(_) => self.fallback_ttl,
                    Err(violation) => {
                        // Handed to waiting callers but never stored.
                        error!(
                            kind = kind.name(),
                            violation = %violation,
                            "synthesized fallback violates its own schema"
                        );
                        Duration::ZERO
                    }
                };
                (Generated::synthesized(value), ttl)
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("providers", &self.inner.chain.provider_names())
            .field("deadline", &self.inner.chain.deadline())
            .field("success_ttl", &self.inner.success_ttl)
            .field("fallback_ttl", &self.inner.fallback_ttl)
            .finish_non_exhaustive()
    }
}
