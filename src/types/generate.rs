//! Provider descriptors and per-call generation options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-attempt timeout for a provider.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

/// Default output budget handed to providers.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Static description of one provider in the fallback chain.
///
/// Descriptors are fixed per deployment and read-only at runtime. Their
/// order in the chain encodes a cost/latency/quality trade-off.
///
/// ```rust
/// # use huginn::ProviderDescriptor;
/// # use std::time::Duration;
/// let fast = ProviderDescriptor::new("gemini-flash", "gemini-2.0-flash")
///     .timeout(Duration::from_secs(8))
///     .max_output_tokens(800)
///     .temperature(0.4);
/// assert_eq!(fast.name, "gemini-flash");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDescriptor {
    /// Name used in logs, metrics and `Generated::provider`.
    pub name: String,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Upper bound on a single attempt.
    pub timeout: Duration,
    /// Maximum output size requested from the provider.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl ProviderDescriptor {
    /// Create a descriptor with default timeout and generation options.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max output tokens.
    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Options handed to the transport for every attempt.
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            model: self.model.clone(),
            max_output_tokens: Some(self.max_output_tokens),
            temperature: Some(self.temperature),
        }
    }
}

/// Options for a single text generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Model to use for generation.
    pub model: String,

    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Sampling temperature (0.0 to 2.0).
    /// Higher values make output more random.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerateOptions {
    /// Create options with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_output_tokens: None,
            temperature: None,
        }
    }

    /// Set max output tokens.
    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
