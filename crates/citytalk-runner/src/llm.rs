//! LLM chat transport and its HTTP implementations.
//!
//! The orchestrator talks to the model through the [`ChatTransport`] trait so
//! tests can script replies. The trait returns a boxed future, which keeps it
//! dyn-compatible without an async-trait macro. Production traffic goes
//! through [`LlmBackend`], an enum over the `OpenAI`-compatible chat
//! completions API and the Anthropic Messages API, both called with
//! `reqwest`.

use futures::future::BoxFuture;
use serde::Serialize;

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::RunnerError;

/// Upper bound on reply length requested from the Anthropic API.
const ANTHROPIC_MAX_TOKENS: u32 = 4096;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the whole conversation.
    System,
    /// Prompts sent by the pipeline.
    User,
    /// Replies produced by the model.
    Assistant,
}

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Everything a backend needs for one completion.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// Full conversation so far, oldest first.
    pub messages: &'a [ChatMessage],
    /// Sampling temperature.
    pub temperature: f64,
}

/// Sends a conversation to a model and returns the reply text.
pub trait ChatTransport: Send + Sync {
    /// Complete the conversation.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Transport`] if the call fails or the reply has
    /// no text content.
    fn send<'a>(&'a self, request: ChatRequest<'a>) -> BoxFuture<'a, Result<String, RunnerError>>;
}

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// An HTTP LLM backend.
pub enum LlmBackend {
    /// `OpenAI`-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

impl ChatTransport for LlmBackend {
    fn send<'a>(&'a self, request: ChatRequest<'a>) -> BoxFuture<'a, Result<String, RunnerError>> {
        Box::pin(async move {
            match self {
                Self::OpenAi(backend) => backend.complete(request).await,
                Self::Anthropic(backend) => backend.complete(request).await,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for `OpenAI`-compatible chat completions APIs.
///
/// Works with `OpenAI`, `DeepSeek`, and Ollama endpoints.
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        }
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, RunnerError> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RunnerError::Transport(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RunnerError::Transport(format!(
                "OpenAI returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RunnerError::Transport(format!("OpenAI response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, RunnerError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            RunnerError::Transport("OpenAI response missing choices[0].message.content".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Anthropic uses a different request format from `OpenAI`:
/// - Uses `x-api-key` header instead of `Authorization: Bearer`
/// - System messages move to a top-level `system` field
/// - Response structure differs: `content[0].text`
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        }
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, RunnerError> {
        let url = format!("{}/messages", self.api_url);
        let body = anthropic_body(request);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RunnerError::Transport(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RunnerError::Transport(format!(
                "Anthropic returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RunnerError::Transport(format!("Anthropic response parse failed: {e}")))?;

        extract_anthropic_content(&json)
    }
}

/// Build a Messages API body, lifting system messages out of the list.
fn anthropic_body(request: ChatRequest<'_>) -> serde_json::Value {
    let (system, turns): (Vec<&ChatMessage>, Vec<&ChatMessage>) = request
        .messages
        .iter()
        .partition(|m| m.role == Role::System);

    let mut body = serde_json::json!({
        "model": request.model,
        "max_tokens": ANTHROPIC_MAX_TOKENS,
        "temperature": request.temperature.min(1.0),
        "messages": turns,
    });
    if let Some(fields) = body.as_object_mut().filter(|_| !system.is_empty()) {
        let text: Vec<&str> = system.iter().map(|m| m.content.as_str()).collect();
        fields.insert("system".to_owned(), serde_json::Value::String(text.join("\n\n")));
    }
    body
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, RunnerError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            RunnerError::Transport("Anthropic response missing content[0].text".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
    }
}
