//! Cooperative shutdown for the stage loops
//!
//! Stage loops poll the flag between queue claims, so an interrupted run
//! stops at a message boundary: claimed tasks finish, unclaimed ones stay
//! queued, and the meta writer never commits a partial record.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// The raw flag, for signal handlers that need swap semantics (first
/// signal requests a graceful stop, a second one force-exits).
pub fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN
}

/// True once a shutdown signal has been seen.
pub fn is_shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_reports_prior_request() {
        // The handler contract: the first swap observes false, repeats
        // observe true
        assert!(!shutdown_flag().swap(true, Ordering::Relaxed));
        assert!(shutdown_flag().swap(true, Ordering::Relaxed));
        assert!(is_shutdown_requested());
    }
}
