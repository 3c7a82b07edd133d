//! The fixed-size set of genomes evaluated in one generation.

use std::cmp::Ordering;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::genome::Genome;

/// Ordered genomes; index `i` belongs to the host's agent `i`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    genomes: Vec<Genome>,
}

impl Population {
    pub(crate) fn new(genomes: Vec<Genome>) -> Self {
        Self { genomes }
    }

    /// Number of genomes.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// All genomes in agent order.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Iterates genomes in agent order.
    pub fn iter(&self) -> std::slice::Iter<'_, Genome> {
        self.genomes.iter()
    }

    /// Indices ordered best first; equal fitness keeps agent order.
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.genomes.len()).collect();
        order.sort_by(|&a, &b| compare_fitness(&self.genomes[b], &self.genomes[a]));
        order
    }

    /// Index of the least fit genome; the latest one loses a tie.
    ///
    /// Genomes not yet evaluated count as weaker than any evaluated one, so
    /// elite copies carried into a new generation are never picked while an
    /// unevaluated child remains.
    pub fn weakest_index(&self) -> Option<usize> {
        self.genomes
            .iter()
            .rposition(|g| g.fitness().is_none())
            .or_else(|| self.ranked_indices().last().copied())
    }

    pub(crate) fn replace(&mut self, index: usize, genome: Genome) -> Genome {
        std::mem::replace(&mut self.genomes[index], genome)
    }
}

impl Index<usize> for Population {
    type Output = Genome;

    fn index(&self, index: usize) -> &Genome {
        &self.genomes[index]
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Genome;
    type IntoIter = std::slice::Iter<'a, Genome>;

    fn into_iter(self) -> Self::IntoIter {
        self.genomes.iter()
    }
}

/// Fitness used for ranking: unset counts as zero, NaN ranks below everything.
pub fn rank_value(genome: &Genome) -> f32 {
    match genome.fitness() {
        Some(f) if f.is_nan() => f32::NEG_INFINITY,
        Some(f) => f,
        None => 0.0,
    }
}

/// Orders two genomes by [`rank_value`], ascending.
pub fn compare_fitness(a: &Genome, b: &Genome) -> Ordering {
    rank_value(a).total_cmp(&rank_value(b))
}
