//! Caller-supplied progress sink.

use tracing::info;

/// Receives human-readable progress lines
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Sink that discards messages
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _message: &str) {}
}

/// Send a line to the sink and mirror it to structured logs.
pub(crate) fn emit(sink: &dyn LogSink, message: &str) {
    info!(target: "autopilot::progress", "{}", message);
    sink.log(message);
}
