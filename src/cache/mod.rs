//! Caching subsystem.
//!
//! [`SingleFlightCache`] is the orchestrator's only shared mutable state: a
//! bounded, process-local TTL cache plus the table of computations
//! currently in flight. Nothing is persisted across restarts.
//!
//! Two TTLs apply to orchestrator results (see [`CacheConfig`]): genuine
//! provider results live for `success_ttl`; synthesized fallbacks live for
//! the much shorter `fallback_ttl`, so an outage self-heals soon after
//! providers recover while still shielding them from a stampede of
//! identical requests during the outage.

pub mod single_flight;

pub use single_flight::{CacheEntry, CacheOutcome, FlightError, Resolution, SingleFlightCache};

use std::time::Duration;

/// Configuration for the orchestrator's result cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(5_000)
///     .success_ttl(Duration::from_secs(600))
///     .fallback_ttl(Duration::from_secs(20));
/// assert!(config.fallback_ttl < config.success_ttl);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for provider results. Default: 5 minutes.
    pub success_ttl: Duration,
    /// Time-to-live for synthesized fallbacks. Default: 30 seconds.
    pub fallback_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            success_ttl: Duration::from_secs(300),
            fallback_ttl: Duration::from_secs(30),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for provider results.
    pub fn success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl = ttl;
        self
    }

    /// Set the time-to-live for synthesized fallbacks.
    pub fn fallback_ttl(mut self, ttl: Duration) -> Self {
        self.fallback_ttl = ttl;
        self
    }
}
