//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use huginn::providers::{GenerateProvider, ProviderAdapter, RetryConfig, RetryingGenerateProvider};
use huginn::schema::{FieldType, Schema};
use huginn::telemetry;
use huginn::{
    FallbackChain, GenerateOptions, GenerationRequest, HuginnError, Orchestrator,
    ProviderDescriptor, Result, kinds,
};

// ============================================================================
// Mock providers
// ============================================================================

struct FixedProvider {
    name: &'static str,
    text: &'static str,
}

#[async_trait]
impl GenerateProvider for FixedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
        Ok(self.text.to_string())
    }
}

struct FailingProvider;

#[async_trait]
impl GenerateProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
        Err(HuginnError::Unreachable("connection refused".into()))
    }
}

struct StalledProvider;

#[async_trait]
impl GenerateProvider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(r#"{"answer": "late"}"#.to_string())
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    counter_with_label(snapshot, name, None)
}

/// Sum counter values matching a name and, optionally, one label pair.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| match label {
            Some((k, v)) => key
                .key()
                .labels()
                .any(|l| l.key() == k && l.value() == v),
            None => true,
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn schema() -> Schema {
    Schema::new().required("answer", FieldType::String)
}

fn adapter(name: &str, provider: Arc<dyn GenerateProvider>) -> ProviderAdapter {
    ProviderAdapter::new(
        ProviderDescriptor::new(name, "test-model").timeout(Duration::from_secs(5)),
        provider,
    )
}

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
fn recorded<F: std::future::Future>(recorder: &DebuggingRecorder, work: F) -> F::Output {
    metrics::with_local_recorder(recorder, || {
        tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(work))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn successful_attempt_records_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = recorded(&recorder, async {
        let mut chain = FallbackChain::new();
        chain.push(adapter(
            "good",
            Arc::new(FixedProvider {
                name: "good",
                text: r#"{"answer": "yes"}"#,
            }),
        ));
        chain.run("prompt", &schema(), "key").await
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::PROVIDER_ATTEMPTS_TOTAL,
            Some(("outcome", "success"))
        ),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::PROVIDER_ATTEMPT_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
    assert_eq!(counter_total(&snapshot, telemetry::CHAIN_EXHAUSTED_TOTAL), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn unusable_output_records_rejection_reason() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = recorded(&recorder, async {
        let mut chain = FallbackChain::new();
        chain.push(adapter(
            "prose",
            Arc::new(FixedProvider {
                name: "prose",
                text: "no json here",
            }),
        ));
        chain.push(adapter(
            "wrong",
            Arc::new(FixedProvider {
                name: "wrong",
                text: r#"{"other": 1}"#,
            }),
        ));
        chain.run("prompt", &schema(), "key").await
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    // Transport succeeded for both attempts.
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::PROVIDER_ATTEMPTS_TOTAL,
            Some(("outcome", "success"))
        ),
        2
    );
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::OUTPUT_REJECTIONS_TOTAL,
            Some(("reason", "no_json_found"))
        ),
        1
    );
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::OUTPUT_REJECTIONS_TOTAL,
            Some(("reason", "schema_violation"))
        ),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::CHAIN_EXHAUSTED_TOTAL), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn transport_failure_records_outcome_label() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    recorded(&recorder, async {
        let mut chain = FallbackChain::new();
        chain.push(adapter("failing", Arc::new(FailingProvider)));
        chain.run("prompt", &schema(), "key").await
    })
    .unwrap_err();

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::PROVIDER_ATTEMPTS_TOTAL,
            Some(("outcome", "unreachable"))
        ),
        1
    );
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::PROVIDER_ATTEMPTS_TOTAL,
            Some(("provider", "failing"))
        ),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn attempt_cut_by_chain_deadline_is_recorded() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let failure = recorded(&recorder, async {
        let mut chain = FallbackChain::new();
        chain.push(ProviderAdapter::new(
            ProviderDescriptor::new("stalled", "test-model").timeout(Duration::from_secs(30)),
            Arc::new(StalledProvider),
        ));
        chain.set_deadline(Some(Duration::from_millis(200)));
        chain.run("prompt", &schema(), "key").await
    })
    .unwrap_err();
    assert_eq!(failure.attempts.len(), 1);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::PROVIDER_ATTEMPTS_TOTAL,
            Some(("outcome", "timeout"))
        ),
        1
    );
    assert!(has_histogram(
        &snapshot,
        telemetry::PROVIDER_ATTEMPT_DURATION_SECONDS
    ));
    assert_eq!(counter_total(&snapshot, telemetry::CHAIN_EXHAUSTED_TOTAL), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn retries_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let config = RetryConfig::new()
        .max_attempts(3)
        .initial_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(2));
    let provider = RetryingGenerateProvider::new(Arc::new(FailingProvider), config);

    let result = recorded(&recorder, async {
        provider
            .generate("prompt", &GenerateOptions::new("test-model"))
            .await
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::RETRIES_TOTAL), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn generations_record_cache_outcome() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let orchestrator = Orchestrator::builder()
        .provider(
            ProviderDescriptor::new("failing", "test-model"),
            Arc::new(FailingProvider),
        )
        .build()
        .unwrap();
    let request = GenerationRequest::new(kinds::key_points(), "prompt").param("topic", "fafsa");

    recorded(&recorder, async {
        orchestrator.generate(&request).await;
        orchestrator.generate(&request).await;
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::GENERATIONS_TOTAL), 2);
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::GENERATIONS_TOTAL,
            Some(("outcome", "fallback_synthesized"))
        ),
        2
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_LOOKUPS_TOTAL, Some(("cache", "miss"))),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_LOOKUPS_TOTAL, Some(("cache", "hit"))),
        1
    );
    assert!(has_histogram(
        &snapshot,
        telemetry::GENERATION_DURATION_SECONDS
    ));
}
