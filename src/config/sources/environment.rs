//! Environment overrides: `AUTOPILOT__SECTION__KEY=value`.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("AUTOPILOT")
            .separator("__")
            .try_parsing(true),
    )
}
