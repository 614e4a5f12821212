//! Persistence layer for the chapter content store

use crate::error::StorageError;
use crate::store::{ChapterContentRecord, ContentStore};
use async_trait::async_trait;
use std::path::Path;

const TREE_CONTENT: &str = "chapter_content";

/// Sled-based implementation of ContentStore
///
/// Records are stored as JSON so fields written by other producers are preserved.
pub struct SledContentStore {
    db: sled::Db,
    content: sled::Tree,
}

impl SledContentStore {
    /// Open (or create) a store at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Self::from_db(db)
    }

    /// Build a store on an already opened database.
    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let content = db.open_tree(TREE_CONTENT)?;
        Ok(Self { db, content })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// All content-keys currently stored, in key order.
    pub fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for item in self.content.iter() {
            let (key, _) = item?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for SledContentStore {
    async fn read_record(&self, key: &str) -> Result<Option<ChapterContentRecord>, StorageError> {
        match self.content.get(key.as_bytes())? {
            Some(value) => {
                let record: ChapterContentRecord = serde_json::from_slice(&value)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn write_record(
        &self,
        key: &str,
        record: &ChapterContentRecord,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_vec(record)?;
        self.content.insert(key.as_bytes(), value)?;
        Ok(())
    }
}
