//! Huginn - generation orchestration for LLM-backed content
//!
//! Huginn sits between request handlers and text-generation providers. It
//! turns "generate content of this kind for these parameters" into a
//! schema-valid JSON value, and it always answers:
//!
//! - identical concurrent requests share one computation (single-flight)
//! - results are cached for a configurable TTL
//! - providers are tried in a fixed priority order until one yields output
//!   that sanitizes into JSON and validates against the kind's schema
//! - when every provider fails, a deterministic placeholder is synthesized
//!   and flagged with `fallback: true`
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use huginn::providers::HttpProvider;
//! use huginn::{GenerationRequest, Orchestrator, ProviderDescriptor, kinds};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let fast = HttpProvider::gemini("fast", "your-gemini-key")?;
//!     let slow = HttpProvider::openai_compatible(
//!         "slow",
//!         "https://api.openai.com/v1",
//!         Some("sk-your-key".to_string()),
//!     )?;
//!
//!     let orchestrator = Orchestrator::builder()
//!         .provider(
//!             ProviderDescriptor::new("fast", "gemini-2.0-flash").timeout(Duration::from_secs(8)),
//!             Arc::new(fast),
//!         )
//!         .provider(
//!             ProviderDescriptor::new("slow", "gpt-4o").timeout(Duration::from_secs(20)),
//!             Arc::new(slow),
//!         )
//!         .build()?;
//!
//!     let request = GenerationRequest::new(
//!         kinds::practice_question(),
//!         "Write one multiple-choice math question for a 6th grader who loves soccer. Reply in JSON.",
//!     )
//!     .param("subject", "math")
//!     .param("interests", vec!["soccer"])
//!     .param("gradeLevel", "6th");
//!
//!     let generated = orchestrator.generate(&request).await;
//!     println!("{}", generated.value);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod chain;
#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod fallback;
pub mod kinds;
pub mod orchestrator;
pub mod providers;
pub mod sanitize;
pub mod schema;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheOutcome, SingleFlightCache};
pub use chain::{ChainFailure, ChainSuccess, FallbackChain};
#[cfg(feature = "config")]
pub use config::Config;
pub use error::{HuginnError, Result};
pub use kinds::{ContentKind, KindCatalog};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use providers::{GenerateProvider, ProviderAdapter, RetryConfig};
pub use sanitize::{JsonSlice, extract_json};
pub use schema::{FieldType, Schema, Violation, validate};
pub use types::{
    AttemptFailure, CacheKey, FailureKind, GenerateOptions, Generated, GenerationOutcome,
    GenerationRequest, ParamValue, Parameters, ProviderDescriptor,
};
