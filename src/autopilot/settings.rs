//! Autopilot settings and run tunables.

use crate::types::ContentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Content types checked when none are configured.
pub const DEFAULT_CONTENT_TYPES: [ContentType; 1] = [ContentType::Notes];

/// Concurrent generation calls allowed per run unless the caller overrides it.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Targets the autopilot samples; supplied externally, immutable for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutopilotConfig {
    #[serde(default)]
    pub target_boards: BTreeSet<String>,

    #[serde(default)]
    pub target_classes: BTreeSet<String>,

    /// Subject names to restrict sampling to. Absent or empty means all subjects.
    #[serde(default)]
    pub target_subjects: Option<BTreeSet<String>>,

    /// Checked in order; the first missing type wins
    #[serde(default)]
    pub content_types: Option<Vec<ContentType>>,

    /// Save generated content as drafts for review instead of publishing
    #[serde(default)]
    pub require_approval: Option<bool>,
}

impl AutopilotConfig {
    pub fn is_complete(&self) -> bool {
        !self.target_boards.is_empty() && !self.target_classes.is_empty()
    }

    pub fn content_types(&self) -> &[ContentType] {
        match &self.content_types {
            Some(types) if !types.is_empty() => types,
            _ => &DEFAULT_CONTENT_TYPES,
        }
    }

    pub fn subject_allow_list(&self) -> Option<&BTreeSet<String>> {
        self.target_subjects.as_ref().filter(|s| !s.is_empty())
    }

    pub fn requires_approval(&self) -> bool {
        self.require_approval.unwrap_or(false)
    }
}

/// Bounds of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanLimits {
    /// Stop scanning once this many gaps are queued
    #[serde(default = "default_target_gap_count")]
    pub target_gap_count: usize,

    /// Random scan attempts allowed per run
    #[serde(default = "default_max_scan_attempts")]
    pub max_scan_attempts: usize,

    /// Questions requested for an MCQ gap
    #[serde(default = "default_mcq_target_count")]
    pub mcq_target_count: usize,
}

fn default_target_gap_count() -> usize {
    2
}

fn default_max_scan_attempts() -> usize {
    20
}

fn default_mcq_target_count() -> usize {
    100
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            target_gap_count: default_target_gap_count(),
            max_scan_attempts: default_max_scan_attempts(),
            mcq_target_count: default_mcq_target_count(),
        }
    }
}

impl ScanLimits {
    pub fn validate(&self) -> Result<(), String> {
        if self.target_gap_count == 0 {
            return Err("target_gap_count must be at least 1".to_string());
        }
        if self.max_scan_attempts == 0 {
            return Err("max_scan_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Settings the runner reads on every invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutopilotSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub config: Option<AutopilotConfig>,

    #[serde(default)]
    pub limits: ScanLimits,
}

/// Per-invocation options
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Run even when disabled, and report busy/misconfigured states to the sink
    pub force: bool,
    pub concurrency: usize,
    /// Passed through to the generator for key rotation
    pub provider_keys: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            force: false,
            concurrency: DEFAULT_CONCURRENCY,
            provider_keys: Vec::new(),
        }
    }
}

impl RunOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }
}
