//! Cooperative stop signal.
//!
//! Long-running loops check the signal between iterations: before dispatching
//! a new row and before flushing a batch. In-flight remote calls are not
//! interrupted; the run winds down at the next checkpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Idempotent; observed at the next checkpoint.
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_is_shared_between_clones() {
        let signal = StopSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_stopped());
        signal.request_stop();
        assert!(clone.is_stopped());
    }
}
