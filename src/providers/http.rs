//! HTTP generation providers.
//!
//! [`HttpProvider`] speaks one of two wire formats:
//! - [`WireFormat::OpenAiChat`]: `POST {base}/chat/completions`, used by
//!   OpenAI and the many services that mirror its API (Groq, OpenRouter,
//!   DeepSeek, Ollama's `/v1`).
//! - [`WireFormat::Gemini`]: `POST {base}/v1beta/models/{model}:generateContent`.
//!
//! The prompt is sent as a single user turn; the text of the first
//! candidate is returned untouched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::GenerateProvider;
use crate::types::GenerateOptions;
use crate::{HuginnError, Result};

/// Default base URL for the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default base URL for the Gemini API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Transport-level ceiling. Attempts are normally cut shorter by the
/// adapter's per-provider timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in a `Rejected` message.
const MAX_ERROR_BODY: usize = 512;

/// Request/response shape spoken by an [`HttpProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    OpenAiChat,
    Gemini,
}

impl WireFormat {
    /// Default base URL for this format.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            WireFormat::OpenAiChat => OPENAI_BASE_URL,
            WireFormat::Gemini => GEMINI_BASE_URL,
        }
    }
}

/// Generation provider backed by an HTTP API.
#[derive(Clone)]
pub struct HttpProvider {
    name: String,
    format: WireFormat,
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpProvider {
    /// Create a provider talking `format` to `base_url`.
    pub fn new(
        name: impl Into<String>,
        format: WireFormat,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HuginnError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            format,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    /// OpenAI-compatible chat completions endpoint.
    pub fn openai_compatible(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        Self::new(name, WireFormat::OpenAiChat, base_url, api_key)
    }

    /// Google Gemini at its public endpoint.
    pub fn gemini(name: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::new(name, WireFormat::Gemini, GEMINI_BASE_URL, Some(api_key.into()))
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    fn build_request(&self, prompt: &str, options: &GenerateOptions) -> RequestBuilder {
        match self.format {
            WireFormat::OpenAiChat => {
                let url = format!("{}/chat/completions", self.base_url);
                let request = self.http.post(url).json(&ChatRequest {
                    model: &options.model,
                    messages: vec![ChatMessage {
                        role: "user",
                        content: prompt,
                    }],
                    max_tokens: options.max_output_tokens,
                    temperature: options.temperature,
                });
                match &self.api_key {
                    Some(key) => request.bearer_auth(key),
                    None => request,
                }
            }
            WireFormat::Gemini => {
                let url = format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url, options.model
                );
                let request = self.http.post(url).json(&GeminiRequest {
                    contents: vec![GeminiContent {
                        parts: vec![GeminiPart { text: prompt }],
                    }],
                    generation_config: GeminiGenerationConfig {
                        max_output_tokens: options.max_output_tokens,
                        temperature: options.temperature,
                    },
                });
                match &self.api_key {
                    Some(key) => request.header("x-goog-api-key", key),
                    None => request,
                }
            }
        }
    }

    async fn read_text(&self, response: Response) -> Result<String> {
        let status = response.status();
        let text = match self.format {
            WireFormat::OpenAiChat => {
                let body: ChatResponse = response.json().await.map_err(|e| malformed(status, e))?;
                body.choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
            }
            WireFormat::Gemini => {
                let body: GeminiResponse =
                    response.json().await.map_err(|e| malformed(status, e))?;
                body.candidates.into_iter().next().map(|candidate| {
                    candidate
                        .content
                        .parts
                        .into_iter()
                        .filter_map(|part| part.text)
                        .collect::<String>()
                })
            }
        };
        text.filter(|t| !t.trim().is_empty())
            .ok_or_else(|| HuginnError::Rejected {
                status: status.as_u16(),
                message: "response contained no text".to_string(),
            })
    }
}

#[async_trait]
impl GenerateProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let response = self
            .build_request(prompt, options)
            .send()
            .await
            .map_err(send_error)?;
        let response = check_status(response).await?;
        self.read_text(response).await
    }
}

/// Map a non-success status to `RateLimited` or `Rejected`.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(HuginnError::RateLimited { retry_after });
    }
    let body = response.text().await.unwrap_or_default();
    Err(HuginnError::Rejected {
        status: status.as_u16(),
        message: body.chars().take(MAX_ERROR_BODY).collect(),
    })
}

fn send_error(e: reqwest::Error) -> HuginnError {
    if e.is_timeout() {
        HuginnError::Timeout(REQUEST_TIMEOUT)
    } else {
        HuginnError::Unreachable(e.to_string())
    }
}

fn malformed(status: StatusCode, e: reqwest::Error) -> HuginnError {
    HuginnError::Rejected {
        status: status.as_u16(),
        message: format!("malformed response body: {e}"),
    }
}

// ============================================================================
// OpenAI-compatible wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Gemini wire types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}
