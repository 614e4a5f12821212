//! Generative Content Provider
//!
//! The autopilot hands every gap to a `ContentGenerator` and only cares whether content came
//! back. `LlmContentGenerator` is the bundled implementation: it talks to any OpenAI-compatible
//! chat-completions endpoint and parses the model's JSON answer into `GeneratedContent`.

use crate::error::ApiError;
use crate::store::McqItem;
use crate::types::{Chapter, MissingKind, Mode, Stream, Subject};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;
pub mod generator;
pub mod prompt;

pub use client::{ChatClient, ChatMessage, CompletionOptions, CompletionResponse, MessageRole};
pub use generator::{LlmContentGenerator, ProviderConfig};
pub use prompt::AUTOPILOT_SYSTEM_PROMPT;

/// Usage tag attached to every autopilot generation call
pub const PILOT_USAGE_TYPE: &str = "PILOT";

/// Everything a generator receives for one gap
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub board: String,
    pub class_level: String,
    pub stream: Option<Stream>,
    pub subject: Subject,
    pub chapter: Chapter,
    pub language: String,
    pub missing_kind: MissingKind,
    /// Items already present; the autopilot always regenerates from zero
    pub base_count: usize,
    pub is_premium: bool,
    /// Number of items wanted (MCQs); zero for notes
    pub target_count: usize,
    pub system_prompt: String,
    pub allow_ai: bool,
    pub mode: Mode,
    pub force_regenerate: bool,
    /// Produce the free and premium notes variants in one call
    pub dual_generation: bool,
    pub usage_type: String,
    /// Credentials the generator may rotate through; never logged
    #[serde(skip)]
    pub provider_keys: Vec<String>,
}

/// Content produced for a gap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    #[serde(default)]
    pub notes_html: Option<String>,
    #[serde(default)]
    pub notes_html_hi: Option<String>,
    #[serde(default)]
    pub free_notes_html: Option<String>,
    #[serde(default)]
    pub mcq_data: Vec<McqItem>,
    #[serde(default)]
    pub mcq_data_hi: Vec<McqItem>,
}

impl GeneratedContent {
    /// No usable notes and no questions.
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        blank(&self.notes_html)
            && blank(&self.notes_html_hi)
            && blank(&self.free_notes_html)
            && self.mcq_data.is_empty()
            && self.mcq_data_hi.is_empty()
    }
}

/// Generative provider interface
///
/// `Ok(None)` means the provider answered but produced nothing usable; `Err` means the call
/// itself failed. The autopilot treats both as a skipped gap.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<GeneratedContent>, ApiError>;
}
