//! Merge rules: defaults applied before any file or environment source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("autopilot.enabled", false)?
        .set_default("provider.model", "gpt-4o-mini")?
        .set_default("catalog.path", "catalog.toml")
}
