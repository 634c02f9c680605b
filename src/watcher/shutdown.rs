use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop flag shared between the watch loop and whatever
/// requests shutdown.
///
/// Requesting shutdown is a single atomic store, so it is safe to call from
/// a signal listener while a capture is blocking on another thread. The loop
/// only observes it between `watch()` iterations.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    continue_looping: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self {
            continue_looping: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn continue_looping(&self) -> bool {
        self.continue_looping.load(Ordering::Acquire)
    }

    pub fn request_shutdown(&self) {
        self.continue_looping.store(false, Ordering::Release);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        !self.continue_looping()
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}
