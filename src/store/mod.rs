//! Chapter Content Store
//!
//! Keyed storage for per-chapter content records. The autopilot only reads the fields it needs
//! to detect gaps and writes back a merged record; everything else on the record is opaque and
//! carried through untouched.

pub mod persistence;

pub use persistence::SledContentStore;

use crate::error::StorageError;
use crate::types::Mode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqItem {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// ChapterContentRecord: stored content for one chapter, keyed by content-key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContentRecord {
    /// Legacy mode-agnostic premium notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_notes_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_premium_notes_html: Option<String>,
    #[serde(
        default,
        rename = "schoolPremiumNotesHtml_HI",
        skip_serializing_if = "Option::is_none"
    )]
    pub school_premium_notes_html_hi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_free_notes_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_premium_notes_html: Option<String>,
    #[serde(
        default,
        rename = "competitionPremiumNotesHtml_HI",
        skip_serializing_if = "Option::is_none"
    )]
    pub competition_premium_notes_html_hi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_free_notes_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_mcq_data: Option<Vec<McqItem>>,
    #[serde(
        default,
        rename = "manualMcqData_HI",
        skip_serializing_if = "Option::is_none"
    )]
    pub manual_mcq_data_hi: Option<Vec<McqItem>>,

    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub is_draft: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn populated(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

impl ChapterContentRecord {
    /// Whether premium notes exist for the mode, falling back to the legacy field.
    pub fn has_premium_notes(&self, mode: Mode) -> bool {
        let mode_specific = match mode {
            Mode::School => &self.school_premium_notes_html,
            Mode::Competition => &self.competition_premium_notes_html,
        };
        populated(mode_specific) || populated(&self.premium_notes_html)
    }

    pub fn has_school_free_notes(&self) -> bool {
        populated(&self.school_free_notes_html)
    }

    pub fn mcq_count(&self) -> usize {
        self.manual_mcq_data.as_ref().map_or(0, Vec::len)
    }
}

/// Content store interface
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the record for a content-key. A missing record is `Ok(None)`.
    async fn read_record(&self, key: &str) -> Result<Option<ChapterContentRecord>, StorageError>;

    /// Upsert the record under a content-key.
    async fn write_record(&self, key: &str, record: &ChapterContentRecord)
        -> Result<(), StorageError>;
}
