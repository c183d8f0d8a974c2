//! Async LLM client for organism decisions
//!
//! Model-agnostic HTTP client. Speaks the Ollama generate API (the default,
//! a local model), Anthropic messages, and OpenAI-compatible chat APIs.
//! The model only suggests actions; it never drives organisms directly.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{EvoError, Result};
use crate::decision::source::{DecisionFuture, DecisionSource};
use crate::llm::context::DecisionContext;
use crate::llm::parser::DECISION_SYSTEM_PROMPT;

pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "gemma:2b-instruct";

/// Decisions are a single short phrase
const MAX_TOKENS: u32 = 100;

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Ollama,
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    pub fn new(api_url: String, model: String, api_key: Option<String>) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Abort HTTP requests that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EvoError::DecisionError(e.to_string()))?;
        Ok(self)
    }

    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("/api/generate") {
            ApiFormat::Ollama
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Optional: LLM_API_URL (defaults to a local Ollama endpoint)
    /// Optional: LLM_MODEL (defaults to gemma:2b-instruct)
    /// Optional: LLM_API_KEY (required for Anthropic and OpenAI endpoints)
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let api_key = std::env::var("LLM_API_KEY").ok();

        let client = Self::new(api_url, model, api_key);
        if client.api_format != ApiFormat::Ollama && client.api_key.is_none() {
            return Err(EvoError::DecisionError(format!(
                "LLM_API_KEY not set for {:?} endpoint",
                client.api_format
            )));
        }
        Ok(client)
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request and return the model's text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Ollama => self.complete_ollama(system, user).await,
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_ollama(&self, system: &str, user: &str) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            system: system.into(),
            prompt: user.into(),
            stream: false,
            options: OllamaOptions {
                num_predict: MAX_TOKENS,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EvoError::DecisionError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvoError::DecisionError(format!("API error: {}", error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EvoError::DecisionError(e.to_string()))?;
        collect_ollama_text(&body)
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", self.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EvoError::DecisionError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvoError::DecisionError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| EvoError::DecisionError(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| EvoError::DecisionError("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| EvoError::DecisionError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvoError::DecisionError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| EvoError::DecisionError(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| EvoError::DecisionError("Empty response".into()))
    }
}

impl DecisionSource for LlmClient {
    fn decide(&self, context: DecisionContext) -> DecisionFuture<'_> {
        Box::pin(async move { self.complete(DECISION_SYSTEM_PROMPT, &context.prompt()).await })
    }
}

/// Concatenate the `response` fields of an Ollama reply
///
/// Handles both a single JSON object and a newline-delimited stream of
/// chunks. Undecodable lines are skipped; a body with no decodable line
/// is an error.
fn collect_ollama_text(body: &str) -> Result<String> {
    let mut text = String::new();
    let mut decoded = 0;
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<OllamaChunk>(line) {
            Ok(chunk) => {
                text.push_str(&chunk.response);
                decoded += 1;
            }
            Err(e) => tracing::warn!(error = %e, "skipping undecodable response line"),
        }
    }

    if decoded == 0 {
        return Err(EvoError::DecisionError("No decodable response".into()));
    }
    Ok(text)
}

// Ollama generate API format
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    system: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    response: String,
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
