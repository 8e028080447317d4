//! Provider trait for text generation transports.
//!
//! A [`GenerateProvider`] is the seam between the orchestration layer and
//! one external generation service. It takes a prompt and options and
//! returns the raw, unparsed text body. Parsing belongs to the chain, so a
//! fake provider can return canned text without any networking.
//!
//! # Error classification
//!
//! Implementations map their failures onto the error taxonomy:
//! - transport failure → [`HuginnError::Unreachable`]
//! - non-2xx response → [`HuginnError::Rejected`] (or
//!   [`HuginnError::RateLimited`] for 429)
//! - transport-level timeout → [`HuginnError::Timeout`]
//!
//! The per-attempt deadline itself is enforced by
//! [`ProviderAdapter`](super::ProviderAdapter), not by implementations.
//!
//! # Example
//!
//! ```ignore
//! struct Canned(&'static str);
//!
//! #[async_trait]
//! impl GenerateProvider for Canned {
//!     fn name(&self) -> &str {
//!         "canned"
//!     }
//!
//!     async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<String> {
//!         Ok(self.0.to_string())
//!     }
//! }
//! ```
//!
//! [`HuginnError::Unreachable`]: crate::HuginnError::Unreachable
//! [`HuginnError::Rejected`]: crate::HuginnError::Rejected
//! [`HuginnError::RateLimited`]: crate::HuginnError::RateLimited
//! [`HuginnError::Timeout`]: crate::HuginnError::Timeout

use async_trait::async_trait;

use crate::Result;
use crate::types::GenerateOptions;

/// Provider for single-turn text generation.
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Non-streaming text generation, returning the raw text body.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;
}
