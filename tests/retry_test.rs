use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use huginn::providers::retry::{RetryConfig, RetryingGenerateProvider};
use huginn::providers::traits::GenerateProvider;
use huginn::{GenerateOptions, HuginnError, Result};

/// Mock provider that fails N times then succeeds.
struct FailThenSucceed {
    fail_count: AtomicU32,
    fail_with: fn() -> HuginnError,
    total_calls: AtomicU32,
}

impl FailThenSucceed {
    fn new(failures: u32, fail_with: fn() -> HuginnError) -> Self {
        Self {
            fail_count: AtomicU32::new(failures),
            fail_with,
            total_calls: AtomicU32::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GenerateProvider for FailThenSucceed {
    fn name(&self) -> &str {
        "mock-retry"
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let remaining = self.fail_count.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_count.fetch_sub(1, Ordering::Relaxed);
            return Err((self.fail_with)());
        }
        Ok(r#"{"ok": true}"#.to_string())
    }
}

fn options() -> GenerateOptions {
    GenerateOptions::new("test-model")
}

fn fast_config(max_attempts: u32) -> RetryConfig {
    RetryConfig::new()
        .max_attempts(max_attempts)
        .initial_delay(Duration::from_millis(10))
        .max_delay(Duration::from_millis(100))
}

#[tokio::test(start_paused = true)]
async fn retries_on_transient_error_then_succeeds() {
    let inner = Arc::new(FailThenSucceed::new(2, || HuginnError::RateLimited {
        retry_after: None,
    }));
    let provider = RetryingGenerateProvider::new(inner.clone(), fast_config(3));

    let text = provider.generate("prompt", &options()).await.unwrap();

    assert_eq!(text, r#"{"ok": true}"#);
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let inner = Arc::new(FailThenSucceed::new(10, || {
        HuginnError::Unreachable("connection reset".into())
    }));
    let provider = RetryingGenerateProvider::new(inner.clone(), fast_config(3));

    let err = provider.generate("prompt", &options()).await.unwrap_err();

    assert!(matches!(err, HuginnError::Unreachable(_)));
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn server_errors_are_retried() {
    let inner = Arc::new(FailThenSucceed::new(1, || HuginnError::Rejected {
        status: 503,
        message: "unavailable".into(),
    }));
    let provider = RetryingGenerateProvider::new(inner.clone(), fast_config(2));

    assert!(provider.generate("prompt", &options()).await.is_ok());
    assert_eq!(inner.call_count(), 2);
}

#[tokio::test]
async fn permanent_error_is_not_retried() {
    let inner = Arc::new(FailThenSucceed::new(1, || HuginnError::Rejected {
        status: 401,
        message: "invalid api key".into(),
    }));
    let provider = RetryingGenerateProvider::new(inner.clone(), fast_config(5));

    let err = provider.generate("prompt", &options()).await.unwrap_err();

    assert!(matches!(err, HuginnError::Rejected { status: 401, .. }));
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test]
async fn disabled_config_makes_a_single_attempt() {
    let inner = Arc::new(FailThenSucceed::new(1, || HuginnError::Timeout(
        Duration::from_secs(1),
    )));
    let provider = RetryingGenerateProvider::new(inner.clone(), RetryConfig::disabled());

    assert!(provider.generate("prompt", &options()).await.is_err());
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_after_hint_sets_the_delay() {
    let inner = Arc::new(FailThenSucceed::new(1, || HuginnError::RateLimited {
        retry_after: Some(Duration::from_secs(2)),
    }));
    let config = RetryConfig::new()
        .max_attempts(2)
        .initial_delay(Duration::from_millis(10))
        .max_delay(Duration::from_secs(10));
    let provider = RetryingGenerateProvider::new(inner.clone(), config);

    let start = tokio::time::Instant::now();
    provider.generate("prompt", &options()).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(inner.call_count(), 2);
}

#[tokio::test]
async fn decorator_keeps_inner_name() {
    let inner = Arc::new(FailThenSucceed::new(0, || HuginnError::NoJsonFound));
    let provider = RetryingGenerateProvider::new(inner, RetryConfig::default());
    assert_eq!(provider.name(), "mock-retry");
}

// ============================================================================
// RetryConfig
// ============================================================================

#[test]
fn retry_config_defaults() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts, 2);
    assert_eq!(config.initial_delay, Duration::from_millis(250));
    assert_eq!(config.max_delay, Duration::from_secs(5));
}

#[test]
fn retry_config_delay_calculation() {
    let config = RetryConfig::new()
        .initial_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(10));

    // Exponential backoff: 100ms, 200ms, 400ms, 800ms, ...
    assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
    assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
    assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
    assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
}
