//! Workspace config layer. A workspace may carry `config/config.toml` and a profile overlay
//! `config/<profile>.toml`; the profile comes from `AUTOPILOT_ENV`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

const PROFILE_VAR: &str = "AUTOPILOT_ENV";
const DEFAULT_PROFILE: &str = "development";

/// Active profile name. Blank values fall back to the default profile.
pub fn active_profile() -> String {
    std::env::var(PROFILE_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Workspace config files that exist, lowest precedence first.
pub fn existing_files(workspace_root: &Path, profile: &str) -> Vec<PathBuf> {
    let dir = workspace_root.join("config");
    let mut candidates = vec![dir.join("config.toml")];
    if profile != "config" {
        candidates.push(dir.join(format!("{}.toml", profile)));
    }
    candidates.into_iter().filter(|path| path.is_file()).collect()
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let profile = active_profile();
    let files = existing_files(workspace_root, &profile);
    if files.is_empty() {
        debug!(workspace = %workspace_root.display(), %profile, "No workspace config files");
    }
    Ok(files.into_iter().fold(builder, |builder, path| {
        debug!(config_path = %path.display(), "Layering workspace config");
        builder.add_source(File::from(path).required(true))
    }))
}
