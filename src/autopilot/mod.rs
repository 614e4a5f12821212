//! Content Autopilot
//!
//! Periodic gap filling: sample the catalog at random for chapters whose stored content is
//! missing notes or MCQs, then generate the missing pieces with bounded concurrency.

pub mod gap;
pub mod guard;
pub mod limiter;
pub mod process;
pub mod run;
pub mod scan;
pub mod settings;
pub mod sink;

pub use gap::{already_queued, content_key, detect_missing, Gap, CONTENT_KEY_PREFIX};
pub use guard::{RunGuard, RunState};
pub use limiter::ConcurrencyLimiter;
pub use process::{merge_generated, BatchReport, GapOutcome, GapProcessor};
pub use run::{Autopilot, RunOutcome, RunReport};
pub use scan::{GapScanner, ScanReport};
pub use settings::{
    AutopilotConfig, AutopilotSettings, RunOptions, ScanLimits, DEFAULT_CONCURRENCY,
    DEFAULT_CONTENT_TYPES,
};
pub use sink::{LogSink, NullSink};
