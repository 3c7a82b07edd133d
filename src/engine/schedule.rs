//! Generation length schedule.
//!
//! Early generations are short so that hopeless genomes are culled quickly;
//! the length then grows logarithmically towards longer trials.

use serde::{Deserialize, Serialize};

/// Shape of the generation length curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleParams {
    /// Length of the first generation in seconds.
    pub starting_length: f32,
    /// Scale of the logarithmic growth term.
    pub max_length: f32,
    /// Amount the curve's input advances each generation.
    pub growth_step: f32,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            starting_length: 8.0,
            max_length: 50.0,
            growth_step: 0.04,
        }
    }
}

/// Tracks the current generation length.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSchedule {
    params: ScheduleParams,
    x: f32,
    length: f32,
}

impl GenerationSchedule {
    /// Starts at the first generation.
    pub fn new(params: ScheduleParams) -> Self {
        Self::resume(params, params.starting_length)
    }

    /// Continues from a saved generation length.
    ///
    /// The curve input restarts at 1, so growth picks up from the saved length
    /// at the slope of a fresh run.
    pub fn resume(params: ScheduleParams, length: f32) -> Self {
        Self {
            params,
            x: 1.0,
            length,
        }
    }

    /// `max_length · log10(x) + starting_length`.
    pub fn length_at(params: &ScheduleParams, x: f32) -> f32 {
        params.max_length * x.log10() + params.starting_length
    }

    /// Current generation length in seconds.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Moves to the next generation and returns its length.
    pub fn advance(&mut self) -> f32 {
        self.x += self.params.growth_step;
        self.length = Self::length_at(&self.params, self.x);
        self.length
    }

    /// Whether the current generation is over.
    pub fn should_end(&self, elapsed: f32, inactive: usize, total: usize) -> bool {
        elapsed > self.length || inactive >= total
    }
}
