//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; the route table dispatches to the autopilot and stores.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_history, format_run_outcome, format_scan_json, format_scan_text};
pub use route::RunContext;
