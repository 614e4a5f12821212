//! Interaction log: an audit trail of automated fills.

pub mod store;

pub use store::SledInteractionLog;

use crate::error::StorageError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind tag recorded for every autopilot fill
pub const AUTO_FILL_KIND: &str = "AUTO_FILL";
pub const AUTOPILOT_ACTOR_ID: &str = "autopilot";
pub const AUTOPILOT_ACTOR_NAME: &str = "AI Autopilot";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEntry {
    pub id: String,
    pub kind: String,
    pub actor_id: String,
    pub actor_name: String,
    pub timestamp_ms: u64,
    pub query: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_key: Option<String>,
}

impl InteractionEntry {
    /// Build an automated-fill entry with a synthetic id derived from the key and time.
    pub fn auto_fill(
        content_key: &str,
        timestamp_ms: u64,
        query: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(content_key.as_bytes());
        hasher.update(&timestamp_ms.to_be_bytes());
        let digest = hasher.finalize();
        Self {
            id: format!("auto-{}", hex::encode(&digest.as_bytes()[..8])),
            kind: AUTO_FILL_KIND.to_string(),
            actor_id: AUTOPILOT_ACTOR_ID.to_string(),
            actor_name: AUTOPILOT_ACTOR_NAME.to_string(),
            timestamp_ms,
            query: query.into(),
            response: response.into(),
            content_key: Some(content_key.to_string()),
        }
    }
}

/// Interaction log interface
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn append(&self, entry: &InteractionEntry) -> Result<(), StorageError>;
}

pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
