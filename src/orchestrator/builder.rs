//! Builder for configuring orchestrator instances

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::Orchestrator;
use crate::cache::CacheConfig;
use crate::chain::FallbackChain;
use crate::providers::{GenerateProvider, ProviderAdapter, RetryConfig, RetryingGenerateProvider};
use crate::types::ProviderDescriptor;
use crate::{HuginnError, Result};

/// Default chain-wide deadline.
pub const DEFAULT_CHAIN_DEADLINE: Duration = Duration::from_secs(45);

/// Builder for [`Orchestrator`].
///
/// Providers are tried in the order they are added.
pub struct OrchestratorBuilder {
    providers: Vec<(ProviderDescriptor, Arc<dyn GenerateProvider>)>,
    cache: CacheConfig,
    chain_deadline: Option<Duration>,
    retry: Option<RetryConfig>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            cache: CacheConfig::default(),
            chain_deadline: Some(DEFAULT_CHAIN_DEADLINE),
            retry: None,
        }
    }

    /// Append a provider to the fallback chain (lowest priority so far).
    pub fn provider(
        mut self,
        descriptor: ProviderDescriptor,
        provider: Arc<dyn GenerateProvider>,
    ) -> Self {
        self.providers.push((descriptor, provider));
        self
    }

    /// Replace the whole cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Time-to-live for provider results.
    pub fn success_ttl(mut self, ttl: Duration) -> Self {
        self.cache.success_ttl = ttl;
        self
    }

    /// Time-to-live for synthesized fallbacks. Must be shorter than
    /// `success_ttl`.
    pub fn fallback_ttl(mut self, ttl: Duration) -> Self {
        self.cache.fallback_ttl = ttl;
        self
    }

    /// Maximum number of cached results.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.cache.max_entries = n;
        self
    }

    /// Overall deadline for one chain run (default: 45s). `None` disables it.
    pub fn chain_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.chain_deadline = deadline;
        self
    }

    /// Retry transient failures inside each provider attempt.
    ///
    /// Retries happen within the adapter's per-attempt timeout.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        if self.cache.fallback_ttl >= self.cache.success_ttl {
            return Err(HuginnError::Configuration(format!(
                "fallback_ttl ({:?}) must be shorter than success_ttl ({:?})",
                self.cache.fallback_ttl, self.cache.success_ttl
            )));
        }
        if self.cache.max_entries == 0 {
            return Err(HuginnError::Configuration(
                "max_entries must be at least 1".to_string(),
            ));
        }
        if self.providers.is_empty() {
            warn!("orchestrator built without providers; every request will be synthesized");
        }

        let mut chain = FallbackChain::new();
        chain.set_deadline(self.chain_deadline);
        for (descriptor, provider) in self.providers {
            let provider: Arc<dyn GenerateProvider> = match &self.retry {
                Some(config) => Arc::new(RetryingGenerateProvider::new(provider, config.clone())),
                None => provider,
            };
            chain.push(ProviderAdapter::new(descriptor, provider));
        }

        Ok(Orchestrator::new(
            chain,
            self.cache.max_entries,
            self.cache.success_ttl,
            self.cache.fallback_ttl,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fallback_ttl_not_shorter() {
        let err = OrchestratorBuilder::new()
            .success_ttl(Duration::from_secs(30))
            .fallback_ttl(Duration::from_secs(30))
            .build()
            .unwrap_err();
        assert!(matches!(err, HuginnError::Configuration(_)));
    }

    #[test]
    fn default_deadline_is_applied() {
        let orchestrator = OrchestratorBuilder::new().build().unwrap();
        assert_eq!(orchestrator.inner.chain.deadline(), Some(DEFAULT_CHAIN_DEADLINE));
        assert!(orchestrator.providers().is_empty());
    }
}
