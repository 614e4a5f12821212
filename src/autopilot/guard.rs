//! Run-state token: at most one autopilot run proceeds at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Busy flag shared by every handle to the same autopilot
///
/// Cloning shares the flag. The flag is only ever set through [`RunState::try_acquire`], whose
/// guard clears it on drop, including during unwinding.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    busy: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the flag, or `None` if another run holds it.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Holds the busy flag for the lifetime of a run
#[derive(Debug)]
#[must_use = "the run is released as soon as the guard is dropped"]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
