//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name from its descriptor (e.g. "gemini-flash")
//! - `outcome`: transport outcome of an attempt: "success", "timeout",
//!   "rejected", "unreachable"; or, for whole generations, "success" |
//!   "fallback_synthesized"
//! - `reason`: why delivered output was unusable: "no_json_found" |
//!   "schema_violation"
//! - `cache`: cache outcome: "hit", "miss" or "joined"
//! - `kind`: content kind name (e.g. "practice_question")

/// Total provider attempts made by the fallback chain.
///
/// Labels: `provider`, `outcome`.
pub const PROVIDER_ATTEMPTS_TOTAL: &str = "huginn_provider_attempts_total";

/// Provider attempt duration in seconds.
///
/// Labels: `provider`.
pub const PROVIDER_ATTEMPT_DURATION_SECONDS: &str = "huginn_provider_attempt_duration_seconds";

/// Provider outputs discarded by the sanitizer or schema validator.
///
/// Labels: `provider`, `reason`.
pub const OUTPUT_REJECTIONS_TOTAL: &str = "huginn_output_rejections_total";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "huginn_retries_total";

/// Total orchestrator cache lookups.
///
/// Labels: `cache` ("hit" | "miss" | "joined").
pub const CACHE_LOOKUPS_TOTAL: &str = "huginn_cache_lookups_total";

/// Total orchestrator generations.
///
/// Labels: `kind`, `cache`, `outcome` ("success" | "fallback_synthesized").
pub const GENERATIONS_TOTAL: &str = "huginn_generations_total";

/// End-to-end orchestrator latency in seconds.
///
/// Labels: `kind`, `cache`.
pub const GENERATION_DURATION_SECONDS: &str = "huginn_generation_duration_seconds";

/// Total chains that exhausted every provider.
///
/// Labels: none.
pub const CHAIN_EXHAUSTED_TOTAL: &str = "huginn_chain_exhausted_total";
