/// LLM Client: the single point of entry for all model calls in the screener.
///
/// ARCHITECTURAL RULE: No other module may call a model provider directly.
/// Pipeline steps receive an `Arc<dyn ModelInvoker>` and never see the HTTP layer,
/// which keeps them testable against a scripted double.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod stub;

use self::prompts::JSON_ONLY_SYSTEM;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM misconfigured: {0}")]
    Config(String),
}

/// The raw answer of a model call.
///
/// Chat-style backends wrap the text in a message with a content field, completion
/// backends hand back a bare string. Callers only ever want the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Message { content: String },
    Text(String),
}

impl ModelReply {
    pub fn into_text(self) -> String {
        match self {
            ModelReply::Message { content } => content,
            ModelReply::Text(text) => text,
        }
    }
}

/// Anything that turns a prompt into model output. Injected into every pipeline step.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<ModelReply, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Provider selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    OpenAi,
    Ollama,
}

impl LlmProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-sonnet-4-5",
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Ollama => "llama3",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "https://api.anthropic.com",
            LlmProvider::OpenAi => "https://api.openai.com",
            LlmProvider::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable holding the credential, if the provider needs one.
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }

    fn endpoint_path(self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "/v1/messages",
            LlmProvider::OpenAi => "/v1/chat/completions",
            LlmProvider::Ollama => "/api/generate",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "openai" => Ok(LlmProvider::OpenAi),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(LlmError::Config(format!("unsupported provider '{other}'"))),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ProviderRequest<'a> {
    Anthropic(AnthropicRequest<'a>),
    OpenAi(OpenAiRequest<'a>),
    Ollama(OllamaRequest<'a>),
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Extracts the text content from the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Anthropic and OpenAI both report `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct StructuredApiError {
    error: StructuredApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct StructuredApiErrorBody {
    message: String,
}

/// Ollama reports `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct PlainApiError {
    error: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by the screening pipeline.
/// Wraps one provider's HTTP API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.provider.api_key_var().is_some() && settings.api_key.is_none() {
            return Err(LlmError::Config(format!(
                "provider '{}' requires an API key",
                settings.provider
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn provider(&self) -> LlmProvider {
        self.settings.provider
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.provider.endpoint_path()
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.settings.api_key.as_deref().unwrap_or_default();
        match self.settings.provider {
            LlmProvider::Anthropic => request
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            LlmProvider::OpenAi => request.bearer_auth(key),
            LlmProvider::Ollama => request,
        }
    }

    /// Makes a raw call to the configured provider.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str) -> Result<ModelReply, LlmError> {
        let request_body = build_request(&self.settings, prompt, JSON_ONLY_SYSTEM);
        let endpoint = self.endpoint();

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .authorize(self.client.post(&endpoint))
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            let body = response.text().await?;

            if !status.is_success() {
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            return parse_reply(self.settings.provider, &body);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ModelInvoker for LlmClient {
    async fn invoke(&self, prompt: &str) -> Result<ModelReply, LlmError> {
        self.call(prompt).await
    }
}

fn build_request<'a>(
    settings: &'a LlmSettings,
    prompt: &'a str,
    system: &'a str,
) -> ProviderRequest<'a> {
    match settings.provider {
        LlmProvider::Anthropic => ProviderRequest::Anthropic(AnthropicRequest {
            model: &settings.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }),
        LlmProvider::OpenAi => ProviderRequest::OpenAi(OpenAiRequest {
            model: &settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        }),
        LlmProvider::Ollama => ProviderRequest::Ollama(OllamaRequest {
            model: &settings.model,
            system,
            prompt,
            stream: false,
        }),
    }
}

/// Decodes a successful provider response body into a `ModelReply`.
fn parse_reply(provider: LlmProvider, body: &str) -> Result<ModelReply, LlmError> {
    let reply = match provider {
        LlmProvider::Anthropic => {
            let response: AnthropicResponse = serde_json::from_str(body)?;
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                response.usage.input_tokens, response.usage.output_tokens
            );
            let text = response.text().ok_or(LlmError::EmptyContent)?;
            ModelReply::Message {
                content: text.to_string(),
            }
        }
        LlmProvider::OpenAi => {
            let response: OpenAiResponse = serde_json::from_str(body)?;
            if let Some(usage) = &response.usage {
                debug!(
                    "LLM call succeeded: input_tokens={}, output_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }
            let content = response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or(LlmError::EmptyContent)?;
            ModelReply::Message { content }
        }
        LlmProvider::Ollama => {
            let response: OllamaResponse = serde_json::from_str(body)?;
            ModelReply::Text(response.response)
        }
    };

    match &reply {
        ModelReply::Message { content } | ModelReply::Text(content)
            if content.trim().is_empty() =>
        {
            Err(LlmError::EmptyContent)
        }
        _ => Ok(reply),
    }
}

fn api_error_message(body: String) -> String {
    if let Ok(e) = serde_json::from_str::<StructuredApiError>(&body) {
        return e.error.message;
    }
    if let Ok(e) = serde_json::from_str::<PlainApiError>(&body) {
        return e.error;
    }
    body
}
