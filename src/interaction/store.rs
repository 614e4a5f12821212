//! Durable sled-backed interaction log.

use std::sync::Arc;

use async_trait::async_trait;
use sled::{Db, Tree};

use crate::error::StorageError;
use crate::interaction::{InteractionEntry, InteractionLog};

const TREE_INTERACTIONS: &str = "interactions";
const TIMESTAMP_KEY_PAD: usize = 20;

#[derive(Clone)]
pub struct SledInteractionLog {
    db: Db,
    entries: Tree,
}

impl SledInteractionLog {
    pub fn new(db: Db) -> Result<Self, StorageError> {
        let entries = db.open_tree(TREE_INTERACTIONS)?;
        Ok(Self { db, entries })
    }

    pub fn shared(db: Db) -> Result<Arc<Self>, StorageError> {
        Ok(Arc::new(Self::new(db)?))
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Newest entries first.
    pub fn recent(&self, limit: usize) -> Result<Vec<InteractionEntry>, StorageError> {
        let mut out = Vec::new();
        for result in self.entries.iter().rev().take(limit) {
            let (_, value) = result?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn encode_entry_key(entry: &InteractionEntry) -> String {
    format!(
        "{:0width$}:{}",
        entry.timestamp_ms,
        entry.id,
        width = TIMESTAMP_KEY_PAD
    )
}

#[async_trait]
impl InteractionLog for SledInteractionLog {
    async fn append(&self, entry: &InteractionEntry) -> Result<(), StorageError> {
        let key = encode_entry_key(entry);
        let value = serde_json::to_vec(entry)?;
        self.entries.insert(key.as_bytes(), value)?;
        Ok(())
    }
}
