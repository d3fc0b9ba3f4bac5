//! WFC session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use super::progress::ProgressSink;
use super::RunGuard;
use crate::wfc::{solve, Ruleset, SolveOptions, WfcOutput};
use crate::world::biome::BiomeGrid;
use crate::world::generation::random::{scramble_seed, seeded_rng};

/// Scramble factor applied to the solver seed between runs
pub const WFC_SEED_FACTOR: f64 = 7.389;

/// Default solver seed
pub const DEFAULT_WFC_SEED: i64 = 3_141_592;

/// Owns the solver seed, the last learned ruleset and the output buffer
#[derive(Debug)]
pub struct WfcSession {
    seed: Mutex<i64>,
    options: Mutex<SolveOptions>,
    running: AtomicBool,
    looping: AtomicBool,
    ruleset: RwLock<Option<Arc<Ruleset>>>,
    output: RwLock<Option<Arc<BiomeGrid>>>,
}

impl Default for WfcSession {
    fn default() -> Self {
        Self::new(DEFAULT_WFC_SEED)
    }
}

/// Copies every snapshot into the session buffer before forwarding it
struct Publisher<'a> {
    output: &'a RwLock<Option<Arc<BiomeGrid>>>,
    inner: &'a mut dyn ProgressSink,
}

impl ProgressSink for Publisher<'_> {
    fn report(&mut self, fraction: f32, completed: &str, next: &str) {
        self.inner.report(fraction, completed, next);
    }

    fn snapshot(&mut self, grid: &BiomeGrid) {
        *self.output.write() = Some(Arc::new(grid.clone()));
        self.inner.snapshot(grid);
    }
}

impl WfcSession {
    pub fn new(seed: i64) -> Self {
        Self {
            seed: Mutex::new(seed),
            options: Mutex::new(SolveOptions::default()),
            running: AtomicBool::new(false),
            looping: AtomicBool::new(false),
            ruleset: RwLock::new(None),
            output: RwLock::new(None),
        }
    }

    pub fn seed(&self) -> i64 {
        *self.seed.lock()
    }

    pub fn set_seed(&self, seed: i64) {
        *self.seed.lock() = seed;
    }

    /// Publish partial grids every `every` collapses, or never with `None`
    pub fn set_snapshot_every(&self, every: Option<usize>) {
        self.options.lock().snapshot_every = every;
    }

    pub fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// A run is in flight and its output buffer keeps changing, either
    /// because it is frame-stepping or because it will restart
    pub fn is_looping(&self) -> bool {
        self.is_running()
            && (self.looping.load(Ordering::Acquire) || self.options.lock().snapshot_every.is_some())
    }

    /// Ruleset learned by the most recent run
    pub fn ruleset(&self) -> Option<Arc<Ruleset>> {
        self.ruleset.read().clone()
    }

    /// Latest finished grid, or the latest snapshot while frame-stepping
    pub fn output(&self) -> Option<Arc<BiomeGrid>> {
        self.output.read().clone()
    }

    /// Learn a ruleset from `source` and synthesize a `width x height` grid,
    /// repeating while looping is enabled.
    ///
    /// The seed evolves after every solve. Returns the last solve, or `None`
    /// without doing anything if a run is already in flight.
    pub fn run(
        &self,
        source: &BiomeGrid,
        width: usize,
        height: usize,
        progress: &mut dyn ProgressSink,
    ) -> Option<WfcOutput> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            log::debug!("WFC already running, request dropped");
            return None;
        };

        let started = Instant::now();
        let ruleset = Arc::new(Ruleset::from_example(source));
        log::info!("Ruleset generated in {:.1?}", started.elapsed());
        *self.ruleset.write() = Some(Arc::clone(&ruleset));

        let mut publisher = Publisher {
            output: &self.output,
            inner: progress,
        };
        loop {
            let seed = self.seed();
            let options = *self.options.lock();
            let mut rng = seeded_rng(seed);
            let result = solve(&mut rng, &ruleset, source, width, height, &options, &mut publisher);

            *self.seed.lock() = scramble_seed(seed, WFC_SEED_FACTOR);
            *self.output.write() = Some(Arc::new(result.grid.clone()));

            if !self.looping.load(Ordering::Acquire) {
                return Some(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::progress::{NullProgress, RecordingProgress};
    use crate::world::biome::Biome;
    use crate::world::grid::Grid;

    fn source() -> BiomeGrid {
        Grid::from_fn(6, 4, |x, y| if x + y < 5 { Biome::Swamp } else { Biome::Rocky })
    }

    /// Counts finished solves and stops looping after two
    struct StopAfterTwo {
        session: Arc<WfcSession>,
        finished: usize,
        nested_dropped: bool,
    }

    impl ProgressSink for StopAfterTwo {
        fn report(&mut self, fraction: f32, _completed: &str, _next: &str) {
            if fraction >= 1.0 {
                self.finished += 1;
                self.nested_dropped = self.session.run(&source(), 4, 4, &mut NullProgress).is_none();
                if self.finished == 2 {
                    self.session.set_looping(false);
                }
            }
        }
    }

    #[test]
    fn test_run_publishes_grid_and_ruleset() {
        let session = WfcSession::default();
        let output = session.run(&source(), 12, 9, &mut NullProgress);
        assert!(output.is_some());
        assert_eq!(session.output().map(|g| g.width()), Some(12));
        assert!(session.ruleset().is_some_and(|r| r.is_consistent()));
        assert_eq!(session.seed(), scramble_seed(DEFAULT_WFC_SEED, WFC_SEED_FACTOR));
    }

    #[test]
    fn test_looping_and_reentrancy() {
        let session = Arc::new(WfcSession::new(99));
        session.set_looping(true);
        let mut sink = StopAfterTwo {
            session: Arc::clone(&session),
            finished: 0,
            nested_dropped: false,
        };
        session.run(&source(), 8, 8, &mut sink);
        assert_eq!(sink.finished, 2);
        assert!(sink.nested_dropped);
        assert!(!session.is_running());
    }

    #[test]
    fn test_frame_stepping_publishes_snapshots() {
        let session = WfcSession::default();
        session.set_snapshot_every(Some(16));
        let mut progress = RecordingProgress::default();
        session.run(&source(), 8, 8, &mut progress);
        assert_eq!(progress.snapshots, 4);
    }

    #[test]
    fn test_same_seed_same_grid() {
        let a = WfcSession::new(5).run(&source(), 10, 10, &mut NullProgress);
        let b = WfcSession::new(5).run(&source(), 10, 10, &mut NullProgress);
        assert_eq!(a.map(|o| o.grid), b.map(|o| o.grid));
    }
}
