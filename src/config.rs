//! Configuration file support.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. `--config <path>`)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//!
//! API keys never live in the file. Each provider names the environment
//! variable holding its key with `api_key_env`.
//!
//! ```toml
//! [cache]
//! max_entries = 10000
//! success_ttl_secs = 300
//! fallback_ttl_secs = 30
//!
//! [chain]
//! deadline_secs = 45      # 0 disables the chain-wide deadline
//!
//! [retry]
//! max_attempts = 2
//!
//! [[providers]]
//! name = "fast"
//! format = "gemini"
//! model = "gemini-2.0-flash"
//! timeout_ms = 8000
//! api_key_env = "GEMINI_API_KEY"
//!
//! [[providers]]
//! name = "slow"
//! format = "open_ai_chat"
//! model = "gpt-4o"
//! timeout_ms = 20000
//! api_key_env = "OPENAI_API_KEY"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::orchestrator::{Orchestrator, OrchestratorBuilder};
use crate::providers::{HttpProvider, RetryConfig, WireFormat};
use crate::types::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_PROVIDER_TIMEOUT, DEFAULT_TEMPERATURE, ProviderDescriptor,
};
use crate::{HuginnError, Result};

/// Orchestrator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub chain: ChainSection,
    /// Retry policy; retries are off when absent.
    #[serde(default)]
    pub retry: Option<RetrySection>,
    /// Providers in fallback order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// Cache sizing and lifetimes.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Maximum cached results (default: 10000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Provider result lifetime in seconds (default: 300).
    #[serde(default = "default_success_ttl")]
    pub success_ttl_secs: u64,
    /// Synthesized fallback lifetime in seconds (default: 30).
    #[serde(default = "default_fallback_ttl")]
    pub fallback_ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            success_ttl_secs: default_success_ttl(),
            fallback_ttl_secs: default_fallback_ttl(),
        }
    }
}

fn default_max_entries() -> u64 {
    10_000
}

fn default_success_ttl() -> u64 {
    300
}

fn default_fallback_ttl() -> u64 {
    30
}

/// Fallback chain settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSection {
    /// Overall deadline in seconds; 0 disables it (default: 45).
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline(),
        }
    }
}

fn default_deadline() -> u64 {
    45
}

/// Retry policy for transient provider failures.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_initial_delay() -> u64 {
    250
}

fn default_max_delay() -> u64 {
    5_000
}

/// One entry of the fallback chain.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub format: WireFormat,
    pub model: String,
    /// Override the format's default endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    pub fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::new(&self.name, &self.model)
            .timeout(
                self.timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT),
            )
            .max_output_tokens(self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS))
            .temperature(self.temperature.unwrap_or(DEFAULT_TEMPERATURE))
    }

    /// Read the API key from the named environment variable.
    pub fn api_key(&self) -> Result<Option<String>> {
        let Some(var) = &self.api_key_env else {
            return Ok(None);
        };
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ => Err(HuginnError::Configuration(format!(
                "provider {:?}: environment variable {var} is not set",
                self.name
            ))),
        }
    }

    fn build_provider(&self) -> Result<HttpProvider> {
        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| self.format.default_base_url().to_string());
        HttpProvider::new(&self.name, self.format, base_url, self.api_key()?)
    }
}

impl Config {
    /// Load configuration from the standard locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            HuginnError::Configuration(msg) => {
                HuginnError::Configuration(format!("{path:?}: {msg}"))
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HuginnError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/huginn/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(HuginnError::Configuration(
            "No config file found. Create ~/.huginn/config.toml or /etc/huginn/config.toml"
                .to_string(),
        ))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.cache.max_entries)
            .success_ttl(Duration::from_secs(self.cache.success_ttl_secs))
            .fallback_ttl(Duration::from_secs(self.cache.fallback_ttl_secs))
    }

    pub fn chain_deadline(&self) -> Option<Duration> {
        match self.chain.deadline_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn retry_config(&self) -> Option<RetryConfig> {
        self.retry.as_ref().map(|r| {
            RetryConfig::new()
                .max_attempts(r.max_attempts)
                .initial_delay(Duration::from_millis(r.initial_delay_ms))
                .max_delay(Duration::from_millis(r.max_delay_ms))
        })
    }

    /// Builder populated from this configuration, with HTTP providers.
    pub fn builder(&self) -> Result<OrchestratorBuilder> {
        let mut builder = Orchestrator::builder()
            .cache(self.cache_config())
            .chain_deadline(self.chain_deadline());
        if let Some(retry) = self.retry_config() {
            builder = builder.retry(retry);
        }
        for provider in &self.providers {
            builder = builder.provider(provider.descriptor(), Arc::new(provider.build_provider()?));
        }
        Ok(builder)
    }
}

impl Orchestrator {
    /// Build an orchestrator from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.chain_deadline(), Some(Duration::from_secs(45)));
        assert!(config.retry_config().is_none());
        assert!(config.providers.is_empty());
    }

    #[test]
    fn zero_deadline_disables() {
        let config = Config::from_toml_str("[chain]\ndeadline_secs = 0").unwrap();
        assert_eq!(config.chain_deadline(), None);
    }

    #[test]
    fn descriptor_defaults() {
        let config = Config::from_toml_str(
            r#"
            [[providers]]
            name = "fast"
            format = "gemini"
            model = "gemini-2.0-flash"
            "#,
        )
        .unwrap();
        let descriptor = config.providers[0].descriptor();
        assert_eq!(descriptor.timeout, DEFAULT_PROVIDER_TIMEOUT);
        assert_eq!(descriptor.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
    }
}
