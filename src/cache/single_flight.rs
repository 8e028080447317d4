//! Keyed TTL cache with single-flight deduplication.
//!
//! [`SingleFlightCache::resolve`] returns a live cached value, or joins the
//! computation already running for the key, or starts that computation.
//! Lookup-or-register happens in one critical section over the in-flight
//! table, so two callers can never both become leader for a key.
//!
//! The leader's work runs on a spawned task. A caller that drops its
//! `resolve` future (e.g. its HTTP connection closed) does not cancel work
//! that followers are still waiting on, and the result still reaches the
//! cache.
//!
//! Failures are shared with every follower and never cached; the next
//! caller for the key becomes a fresh leader.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use crate::telemetry;

type Flight<V, E> = Shared<BoxFuture<'static, Result<V, FlightError<E>>>>;

/// How a `resolve` call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOutcome {
    /// Served from a live cache entry.
    Hit,
    /// This caller led a fresh computation.
    Miss,
    /// Attached to a computation another caller started.
    Joined,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Joined => "joined",
        }
    }
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error observed by every caller attached to a failed flight.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlightError<E> {
    /// The computation returned an error.
    #[error("{0}")]
    Failed(E),
    /// The leader task panicked or was cancelled by runtime shutdown.
    #[error("leader task aborted: {0}")]
    Aborted(String),
}

/// Result of [`SingleFlightCache::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution<V, E> {
    pub outcome: CacheOutcome,
    pub result: Result<V, FlightError<E>>,
}

/// A stored value with its expiry. Expiry is checked lazily on lookup.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            ttl,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn stored_at(&self) -> Instant {
        self.stored_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live strictly before `stored_at + ttl`. A TTL past the end of the
    /// clock never expires.
    pub fn is_live(&self, now: Instant) -> bool {
        self.stored_at
            .checked_add(self.ttl)
            .is_none_or(|expiry| now < expiry)
    }
}

struct State<K, V, E> {
    /// Bounded LRU storage; moka evicts on capacity only, TTL is ours.
    entries: moka::sync::Cache<K, CacheEntry<V>>,
    in_flight: Mutex<HashMap<K, (u64, Flight<V, E>)>>,
    next_id: AtomicU64,
}

impl<K, V, E> State<K, V, E>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<K, (u64, Flight<V, E>)>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_value(&self, key: &K) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_live(Instant::now()) {
            Some(entry.value)
        } else {
            self.entries.invalidate(key);
            None
        }
    }
}

/// Keyed TTL cache plus in-flight table.
///
/// Cloning is cheap and clones share state.
pub struct SingleFlightCache<K, V, E> {
    state: Arc<State<K, V, E>>,
}

impl<K, V, E> Clone for SingleFlightCache<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K, V, E> SingleFlightCache<K, V, E>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `max_entries` values.
    pub fn new(max_entries: u64) -> Self {
        Self {
            state: Arc::new(State {
                entries: moka::sync::Cache::new(max_entries),
                in_flight: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Resolve `key`, storing a successful result for `ttl`.
    pub async fn resolve<F, Fut>(&self, key: K, ttl: Duration, compute: F) -> Resolution<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        self.resolve_with(key, move || {
            let work = compute();
            async move { work.await.map(|value| (value, ttl)) }
        })
        .await
    }

    /// Resolve `key`, letting the computation choose the TTL of its result.
    ///
    /// `compute` is called at most once, and only when this caller becomes
    /// leader. It runs while the in-flight table is locked, so it should
    /// only build the future; the future itself runs on a spawned task.
    /// A zero TTL hands the value to followers without storing it.
    pub async fn resolve_with<F, Fut>(&self, key: K, compute: F) -> Resolution<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(V, Duration), E>> + Send + 'static,
    {
        let (flight, outcome) = {
            let mut in_flight = self.state.lock_in_flight();
            if let Some(value) = self.state.live_value(&key) {
                drop(in_flight);
                record_lookup(CacheOutcome::Hit);
                return Resolution {
                    outcome: CacheOutcome::Hit,
                    result: Ok(value),
                };
            }
            match in_flight.get(&key) {
                Some((_, flight)) => (flight.clone(), CacheOutcome::Joined),
                None => {
                    let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
                    let flight = launch(Arc::clone(&self.state), key.clone(), id, compute());
                    in_flight.insert(key, (id, flight.clone()));
                    (flight, CacheOutcome::Miss)
                }
            }
        };
        record_lookup(outcome);
        Resolution {
            outcome,
            result: flight.await,
        }
    }

    /// Live cached value for `key`, without starting any work.
    pub fn get(&self, key: &K) -> Option<V> {
        self.state.live_value(key)
    }

    /// Store or overwrite a value (explicit refresh).
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        if !ttl.is_zero() {
            self.state.entries.insert(key, CacheEntry::new(value, ttl));
        }
    }

    /// Drop the cached value for `key`. Running work is unaffected.
    pub fn invalidate(&self, key: &K) {
        self.state.entries.invalidate(key);
    }

    /// Drop every cached value.
    pub fn clear(&self) {
        self.state.entries.invalidate_all();
    }

    /// Number of keys with work currently running.
    pub fn in_flight(&self) -> usize {
        self.state.lock_in_flight().len()
    }
}

fn record_lookup(outcome: CacheOutcome) {
    metrics::counter!(telemetry::CACHE_LOOKUPS_TOTAL, "cache" => outcome.as_str()).increment(1);
}

/// Spawn the leader's work and wrap its handle in a shareable future.
fn launch<K, V, E, Fut>(state: Arc<State<K, V, E>>, key: K, id: u64, work: Fut) -> Flight<V, E>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(V, Duration), E>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let guard = FlightGuard {
            state,
            key,
            id,
            done: false,
        };
        match work.await {
            Ok((value, ttl)) => {
                guard.finish(Some((value.clone(), ttl)));
                Ok(value)
            }
            Err(e) => {
                guard.finish(None);
                Err(FlightError::Failed(e))
            }
        }
    });

    async move {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(FlightError::Aborted(e.to_string())),
        }
    }
    .boxed()
    .shared()
}

/// Removes the in-flight registration when the leader's work ends,
/// including by panic.
struct FlightGuard<K, V, E>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    state: Arc<State<K, V, E>>,
    key: K,
    id: u64,
    done: bool,
}

impl<K, V, E> FlightGuard<K, V, E>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Store the result (if any) and deregister, as one critical section.
    fn finish(mut self, store: Option<(V, Duration)>) {
        self.done = true;
        let mut in_flight = self.state.lock_in_flight();
        if let Some((value, ttl)) = store {
            if !ttl.is_zero() {
                self.state
                    .entries
                    .insert(self.key.clone(), CacheEntry::new(value, ttl));
            }
        }
        Self::deregister(&mut in_flight, &self.key, self.id);
    }

    fn deregister(in_flight: &mut HashMap<K, (u64, Flight<V, E>)>, key: &K, id: u64) {
        if in_flight.get(key).is_some_and(|(current, _)| *current == id) {
            in_flight.remove(key);
        }
    }
}

impl<K, V, E> Drop for FlightGuard<K, V, E>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.done {
            let mut in_flight = self.state.lock_in_flight();
            Self::deregister(&mut in_flight, &self.key, self.id);
        }
    }
}
