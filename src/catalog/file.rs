//! TOML-backed catalog.
//!
//! ```toml
//! [[subjects]]
//! id = "sci"
//! name = "Science"
//! classes = ["9", "10"]
//!
//! [[chapters]]
//! board = "CBSE"
//! class_level = "10"
//! subject = "Science"
//! id = "ch1"
//! title = "Light"
//! ```

use crate::catalog::CatalogProvider;
use crate::error::ApiError;
use crate::types::{Chapter, Stream, Subject, DEFAULT_LANGUAGE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub id: String,
    pub name: String,
    /// Class levels offering the subject
    #[serde(default)]
    pub classes: Vec<String>,
    /// Streams offering the subject (senior classes only). Empty means every stream.
    #[serde(default)]
    pub streams: Vec<Stream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterEntry {
    pub board: String,
    pub class_level: String,
    #[serde(default)]
    pub stream: Option<Stream>,
    pub subject: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub id: String,
    pub title: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileCatalog {
    #[serde(default)]
    pub subjects: Vec<SubjectEntry>,
    #[serde(default)]
    pub chapters: Vec<ChapterEntry>,
}

impl FileCatalog {
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ApiError::CatalogError(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ApiError> {
        Ok(toml::from_str(raw)?)
    }
}

#[async_trait]
impl CatalogProvider for FileCatalog {
    async fn list_subjects(
        &self,
        class_level: &str,
        stream: Option<Stream>,
    ) -> Result<Vec<Subject>, ApiError> {
        Ok(self
            .subjects
            .iter()
            .filter(|s| s.classes.iter().any(|c| c == class_level))
            .filter(|s| match stream {
                Some(stream) => s.streams.is_empty() || s.streams.contains(&stream),
                None => true,
            })
            .map(|s| Subject {
                id: s.id.clone(),
                name: s.name.clone(),
            })
            .collect())
    }

    async fn list_chapters(
        &self,
        board: &str,
        class_level: &str,
        stream: Option<Stream>,
        subject: &Subject,
        language: &str,
    ) -> Result<Vec<Chapter>, ApiError> {
        Ok(self
            .chapters
            .iter()
            .filter(|c| {
                c.board == board
                    && c.class_level == class_level
                    && c.subject == subject.name
                    && c.language == language
                    && (c.stream.is_none() || c.stream == stream)
            })
            .map(|c| Chapter {
                id: c.id.clone(),
                title: c.title.clone(),
            })
            .collect())
    }
}
