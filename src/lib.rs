//! Content Autopilot
//!
//! Finds chapters in an educational catalog whose stored content lacks premium notes or an
//! MCQ set, generates the missing pieces through a pluggable generator, and records every
//! automated fill in an interaction log.

pub mod autopilot;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod interaction;
pub mod logging;
pub mod provider;
pub mod store;
pub mod types;
