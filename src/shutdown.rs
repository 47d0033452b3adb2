// Graceful shutdown handling

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared shutdown flag, polled by the serve loop and tripped by the signal
/// handler (or by tests).
#[derive(Clone)]
pub struct ShutdownState {
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a shutdown
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        log::info!("Shutdown requested");
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_flag_is_shared_across_clones() {
        let state = ShutdownState::new();
        let clone = state.clone();
        assert!(!clone.is_shutdown_requested());
        state.request_shutdown();
        assert!(clone.is_shutdown_requested());
    }
}
