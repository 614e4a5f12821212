//! Catalog Provider
//!
//! Subject and chapter taxonomy the autopilot samples. The scanner only needs two lookups, so the
//! trait stays narrow; `FileCatalog` is the bundled TOML-backed implementation.

use crate::error::ApiError;
use crate::types::{Chapter, Stream, Subject};
use async_trait::async_trait;

pub mod file;

pub use file::FileCatalog;

/// Catalog provider interface
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Subjects offered for a class level (and stream, for senior classes).
    async fn list_subjects(
        &self,
        class_level: &str,
        stream: Option<Stream>,
    ) -> Result<Vec<Subject>, ApiError>;

    /// Chapters of a subject, in catalog order. May be empty.
    async fn list_chapters(
        &self,
        board: &str,
        class_level: &str,
        stream: Option<Stream>,
        subject: &Subject,
        language: &str,
    ) -> Result<Vec<Chapter>, ApiError>;
}
