//! Progress reporting
//!
//! Both pipelines call a [`ProgressSink`] at fixed checkpoints so a host can
//! show progress bars or live previews.

use crate::world::BiomeGrid;

/// Receives checkpoint notifications from a running pipeline
pub trait ProgressSink {
    /// `fraction` runs from 0 to 1; `completed` names the stage just
    /// finished and `next` the one about to start
    fn report(&mut self, fraction: f32, completed: &str, next: &str);

    /// A partially collapsed WFC grid, published every few collapses when
    /// frame-stepping is enabled
    fn snapshot(&mut self, _grid: &BiomeGrid) {}
}

/// Ignores every checkpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _fraction: f32, _completed: &str, _next: &str) {}
}

/// Forwards checkpoints to the log at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, fraction: f32, completed: &str, next: &str) {
        log::debug!(
            "[{:>3.0}%] {} done, next: {}",
            fraction * 100.0,
            if completed.is_empty() { "-" } else { completed },
            next
        );
    }

    fn snapshot(&mut self, grid: &BiomeGrid) {
        log::trace!("Snapshot {}x{}", grid.width(), grid.height());
    }
}

/// Records every checkpoint, for tests and headless hosts
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    pub checkpoints: Vec<(f32, String, String)>,
    pub snapshots: usize,
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, fraction: f32, completed: &str, next: &str) {
        self.checkpoints
            .push((fraction, completed.to_string(), next.to_string()));
    }

    fn snapshot(&mut self, _grid: &BiomeGrid) {
        self.snapshots += 1;
    }
}
