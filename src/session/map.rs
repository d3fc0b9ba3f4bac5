//! Map generation session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::progress::ProgressSink;
use super::RunGuard;
use crate::world::biome::BiomeGrid;
use crate::world::generation::{generate_map, GenerationParams, MapOutput};

/// Owns the generation parameters and the latest finished map
#[derive(Debug, Default)]
pub struct MapSession {
    params: Mutex<GenerationParams>,
    running: AtomicBool,
    looping: AtomicBool,
    output: RwLock<Option<Arc<MapOutput>>>,
}

impl MapSession {
    pub fn new(params: GenerationParams) -> Self {
        Self {
            params: Mutex::new(params),
            ..Self::default()
        }
    }

    /// Current parameters, including any seed evolution from earlier runs
    pub fn params(&self) -> GenerationParams {
        self.params.lock().clone()
    }

    /// Edit the parameters in place; picked up by the next run
    pub fn update_params(&self, edit: impl FnOnce(&mut GenerationParams)) {
        edit(&mut self.params.lock());
    }

    pub fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// A run is in flight and will restart when it finishes
    pub fn is_looping(&self) -> bool {
        self.is_running() && self.looping.load(Ordering::Acquire)
    }

    /// The most recent finished map
    pub fn output(&self) -> Option<Arc<MapOutput>> {
        self.output.read().clone()
    }

    /// Generate a map from `coarse`, then again while looping is enabled.
    ///
    /// Seeds evolve after every run. Returns the last map produced, or
    /// `None` without doing anything if a run is already in flight.
    pub fn run(&self, coarse: &BiomeGrid, progress: &mut dyn ProgressSink) -> Option<Arc<MapOutput>> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            log::debug!("Map generation already running, request dropped");
            return None;
        };

        let mut runs = 0usize;
        loop {
            let params = self.params();
            let output = Arc::new(generate_map(coarse, &params, progress));
            self.params.lock().evolve_seeds();
            *self.output.write() = Some(Arc::clone(&output));
            runs += 1;

            if !self.looping.load(Ordering::Acquire) {
                log::debug!("Map session finished after {} run(s)", runs);
                return Some(output);
            }
        }
    }
}
