//! Run sessions
//!
//! Owners for the map and WFC pipelines. A session allows one run in flight,
//! can loop runs back to back with evolving seeds, and publishes each result
//! by swapping a shared buffer.

pub mod map;
pub mod progress;
pub mod wfc;

pub use map::MapSession;
pub use progress::{LogProgress, NullProgress, ProgressSink, RecordingProgress};
pub use wfc::WfcSession;

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a session's running flag for the length of a run
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    /// `None` when a run is already in flight
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = RunGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(RunGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(RunGuard::acquire(&flag).is_some());
    }
}
