//! Fitness summaries per generation and a bounded history of them.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::genome::Genome;
use super::population::rank_value;

/// Fitness summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation the fitness values were measured in (1-based).
    pub generation: u32,
    /// Highest fitness reported.
    pub best_fitness: f32,
    /// Mean of the reported fitness values.
    pub average_fitness: f32,
    /// Lowest fitness reported.
    pub worst_fitness: f32,
    /// Mean weight distance of every genome to the fittest one.
    pub diversity: f32,
}

impl GenerationStats {
    /// Summarizes a population ranked best first.
    pub fn from_ranked(generation: u32, ranked: &[Genome]) -> Self {
        let Some(best) = ranked.first() else {
            return Self {
                generation,
                best_fitness: 0.0,
                average_fitness: 0.0,
                worst_fitness: 0.0,
                diversity: 0.0,
            };
        };

        let count = ranked.len() as f32;
        let total: f32 = ranked.iter().map(|g| g.fitness().unwrap_or(0.0)).sum();
        let spread: f32 = ranked.iter().map(|g| Genome::distance(best, g)).sum();

        Self {
            generation,
            best_fitness: rank_value(best),
            average_fitness: total / count,
            worst_fitness: ranked.last().map_or(0.0, rank_value),
            diversity: spread / count,
        }
    }
}

/// Bounded history of generation summaries, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessHistory {
    entries: VecDeque<GenerationStats>,
    /// Maximum number of generations to keep.
    pub max_history: usize,
}

impl Default for FitnessHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl FitnessHistory {
    /// Creates an empty history keeping at most `max_history` generations.
    pub fn new(max_history: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Appends a summary, dropping the oldest when full.
    pub fn record(&mut self, stats: GenerationStats) {
        self.entries.push_back(stats);
        while self.entries.len() > self.max_history {
            self.entries.pop_front();
        }
    }

    /// All retained summaries, oldest first.
    pub fn entries(&self) -> &VecDeque<GenerationStats> {
        &self.entries
    }

    /// Most recent summary.
    pub fn latest(&self) -> Option<&GenerationStats> {
        self.entries.back()
    }

    /// Highest best-fitness across the retained generations.
    pub fn best_ever(&self) -> Option<f32> {
        self.entries
            .iter()
            .map(|s| s.best_fitness)
            .max_by(f32::total_cmp)
    }

    /// Clears all summaries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
