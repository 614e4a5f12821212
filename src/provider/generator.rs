//! LLM-backed content generator.

use crate::error::ApiError;
use crate::provider::client::{ChatClient, ChatMessage, CompletionOptions};
use crate::provider::prompt::build_user_prompt;
use crate::provider::{ContentGenerator, GeneratedContent, GenerationRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Model name (e.g., "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,

    /// Fallback API key used when a run supplies no provider keys
    #[serde(default)]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL (defaults to api.openai.com)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            endpoint: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("Endpoint must be an http(s) URL: {}", endpoint));
            }
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("Temperature must be within 0.0-2.0, got {}", t));
            }
        }
        Ok(())
    }

    fn completion_options(&self) -> CompletionOptions {
        let defaults = CompletionOptions::default();
        CompletionOptions {
            temperature: self.temperature.or(defaults.temperature),
            max_tokens: self.max_tokens,
            json_mode: true,
        }
    }
}

/// Generator that prompts a chat model and parses its JSON answer
pub struct LlmContentGenerator {
    client: ChatClient,
    config: ProviderConfig,
    next_key: AtomicUsize,
}

impl LlmContentGenerator {
    pub fn new(config: ProviderConfig) -> Result<Self, ApiError> {
        config.validate().map_err(ApiError::ConfigError)?;
        let client = ChatClient::new(config.model.clone(), config.endpoint.clone())?;
        Ok(Self {
            client,
            config,
            next_key: AtomicUsize::new(0),
        })
    }

    /// Round-robin over the request's keys, falling back to the configured key.
    fn select_key<'a>(&'a self, request: &'a GenerationRequest) -> Result<&'a str, ApiError> {
        let keys: Vec<&str> = request
            .provider_keys
            .iter()
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
            .collect();
        if !keys.is_empty() {
            let slot = self.next_key.fetch_add(1, Ordering::Relaxed) % keys.len();
            return Ok(keys[slot]);
        }
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ApiError::ProviderNotConfigured(
                    "No API key: set provider.api_key or pass --provider-key".to_string(),
                )
            })
    }
}

/// Parse a model answer, tolerating a surrounding markdown code fence.
pub fn parse_generated(raw: &str) -> Result<GeneratedContent, ApiError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(body)
        .map_err(|e| ApiError::GenerationFailed(format!("Model answer is not valid JSON: {}", e)))
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<GeneratedContent>, ApiError> {
        if !request.allow_ai {
            return Ok(None);
        }
        let api_key = self.select_key(request)?;
        let messages = vec![
            ChatMessage::system(request.system_prompt.clone()),
            ChatMessage::user(build_user_prompt(request)),
        ];

        let response = self
            .client
            .complete(api_key, messages, &self.config.completion_options())
            .await?;
        debug!(
            model = %response.model,
            total_tokens = response.total_tokens,
            finish_reason = ?response.finish_reason,
            chapter = %request.chapter.title,
            "Generation completed"
        );

        let content = parse_generated(&response.content)?;
        if content.is_empty() {
            warn!(chapter = %request.chapter.title, "Model returned no usable content");
            return Ok(None);
        }
        Ok(Some(content))
    }
}
