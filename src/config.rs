//! Configuration file for the demo host.

use std::path::Path;

use serde::{Deserialize, Serialize};

use neurodroids::engine::params::EvolverParams;
use neurodroids::engine::schedule::ScheduleParams;

use crate::arena::ArenaParams;

/// Everything the demo needs to start a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Number of droids, and therefore genomes.
    pub population_size: usize,
    /// Genetic algorithm settings. `population_size` and `num_weights` are
    /// derived from the rest of the config when a run starts.
    pub evolver: EvolverParams,
    /// Generation length curve.
    pub schedule: ScheduleParams,
    /// Arena and droid settings.
    pub arena: ArenaParams,
    /// Seed for the genetic algorithm.
    pub genome_seed: u64,
    /// Seed for droid spawn positions.
    pub spawn_seed: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            evolver: EvolverParams::default(),
            schedule: ScheduleParams::default(),
            arena: ArenaParams::default(),
            genome_seed: 2,
            spawn_seed: 10,
        }
    }
}

impl DemoConfig {
    /// Evolver parameters sized for this config's population and droid brain.
    pub fn evolver_params(&self) -> EvolverParams {
        EvolverParams {
            population_size: self.population_size,
            num_weights: self.arena.topology().weight_count(),
            ..self.evolver.clone()
        }
    }

    /// Loads a config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Saves the config as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
