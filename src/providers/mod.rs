//! Generation providers and the adapters that bound them.
//!
//! - [`traits`]: the [`GenerateProvider`] transport seam
//! - [`adapter`]: [`ProviderAdapter`]: descriptor + transport + timeout
//! - [`retry`]: optional retry decorator for transient failures
//! - [`http`]: reqwest-backed providers (feature `http`)

pub mod adapter;
#[cfg(feature = "http")]
pub mod http;
pub mod retry;
pub mod traits;

pub use adapter::ProviderAdapter;
#[cfg(feature = "http")]
pub use http::{HttpProvider, WireFormat};
pub use retry::{RetryConfig, RetryingGenerateProvider};
pub use traits::GenerateProvider;
