//! Generational genetic algorithm.
//!
//! The evolver owns one [`Population`]. Each call to
//! [`Evolver::new_generation`] ranks it by the host's fitness values, carries
//! the elite forward unchanged and breeds the rest with fitness-proportionate
//! selection, single-point crossover and mutation. The new population replaces
//! the old one only once it is complete.

use rand::Rng;

use super::error::{EvolutionError, Result};
use super::genome::Genome;
use super::params::EvolverParams;
use super::population::{Population, compare_fitness, rank_value};
use super::select::select_top_n;
use super::stats::{FitnessHistory, GenerationStats};

/// Lifecycle of an [`Evolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolverState {
    /// Constructed, no population yet.
    Uninitialized,
    /// Holds a population the host can evaluate.
    Ready,
}

/// Runs generational replacement over a fixed-size population.
#[derive(Debug, Clone)]
pub struct Evolver {
    params: EvolverParams,
    population: Option<Population>,
    generation: u32,
    history: FitnessHistory,
}

impl Evolver {
    /// Validates the parameters and creates an evolver with no population.
    pub fn new(params: EvolverParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            population: None,
            generation: 0,
            history: FitnessHistory::default(),
        })
    }

    /// Parameters the evolver was built with.
    pub fn params(&self) -> &EvolverParams {
        &self.params
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EvolverState {
        if self.population.is_some() {
            EvolverState::Ready
        } else {
            EvolverState::Uninitialized
        }
    }

    /// Number of completed generation steps since the last `initialize`.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Fitness summaries of recent generations.
    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }

    /// The live population.
    pub fn population(&self) -> Result<&Population> {
        self.population.as_ref().ok_or(EvolutionError::Uninitialized)
    }

    /// Fills the population from seeds, topping up with random genomes.
    ///
    /// Seeds beyond `population_size` are dropped. Every seed must have
    /// `num_weights` weights. Recorded seed fitness is cleared.
    pub fn initialize<R: Rng + ?Sized>(&mut self, seeds: Vec<Genome>, rng: &mut R) -> Result<()> {
        let size = self.params.population_size;
        let num_weights = self.params.num_weights;

        if let Some(bad) = seeds.iter().find(|g| g.len() != num_weights) {
            return Err(EvolutionError::DimensionMismatch {
                what: "seed genome",
                expected: num_weights,
                actual: bad.len(),
            });
        }

        if seeds.len() > size {
            log::warn!(
                "{} seed genomes supplied for a population of {}; keeping the first {}",
                seeds.len(),
                size,
                size
            );
        }

        let seeded = seeds.len().min(size);
        let (low, high) = self.params.init_range;

        let mut genomes: Vec<Genome> = seeds
            .into_iter()
            .take(size)
            .map(|g| Genome::new(g.weights().to_vec()))
            .collect();
        genomes.extend((seeded..size).map(|_| Genome::random(num_weights, &mut *rng, low..=high)));

        log::debug!(
            "initialized population: {} seeded, {} random, {} weights each",
            seeded,
            size - seeded,
            num_weights
        );

        self.population = Some(Population::new(genomes));
        self.generation = 0;
        self.history.clear();
        Ok(())
    }

    /// Records fitness for the current population and replaces it with the
    /// next generation.
    ///
    /// `fitness[i]` belongs to genome `i`. On error the population is left as
    /// it was.
    pub fn new_generation<R: Rng + ?Sized>(
        &mut self,
        fitness: &[f32],
        rng: &mut R,
    ) -> Result<GenerationStats> {
        let current = self.population.as_ref().ok_or(EvolutionError::Uninitialized)?;
        if fitness.len() != current.len() {
            return Err(EvolutionError::ArgumentMismatch {
                expected: current.len(),
                actual: fitness.len(),
            });
        }

        let mut scored: Vec<Genome> = current.genomes().to_vec();
        for (genome, &f) in scored.iter_mut().zip(fitness) {
            genome.set_fitness(f);
        }
        // stable: equal fitness keeps agent order
        scored.sort_by(|a, b| compare_fitness(b, a));

        let stats = GenerationStats::from_ranked(self.generation + 1, &scored);

        let next = self.breed(&scored, rng)?;
        debug_assert_eq!(next.len(), self.params.population_size);

        self.population = Some(Population::new(next));
        self.generation += 1;
        self.history.record(stats);

        log::info!(
            "generation {}: best {:.3}, average {:.3}, diversity {:.3}",
            stats.generation,
            stats.best_fitness,
            stats.average_fitness,
            stats.diversity
        );

        Ok(stats)
    }

    /// Replaces the weakest genome with `genome` and returns its index.
    pub fn import_genome(&mut self, genome: Genome) -> Result<usize> {
        let num_weights = self.params.num_weights;
        let population = self.population.as_mut().ok_or(EvolutionError::Uninitialized)?;

        if genome.len() != num_weights {
            return Err(EvolutionError::DimensionMismatch {
                what: "imported genome",
                expected: num_weights,
                actual: genome.len(),
            });
        }

        let index = population
            .weakest_index()
            .ok_or(EvolutionError::Uninitialized)?;
        population.replace(index, genome);
        log::debug!("imported genome into slot {}", index);

        Ok(index)
    }

    /// Clones of the `n` fittest genomes, best first.
    pub fn fittest(&self, n: usize) -> Result<Vec<Genome>> {
        let population = self.population()?;
        Ok(select_top_n(population.genomes(), n, compare_fitness)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Builds the next generation from genomes ranked best first.
    fn breed<R: Rng + ?Sized>(&self, ranked: &[Genome], rng: &mut R) -> Result<Vec<Genome>> {
        let size = self.params.population_size;
        let mut next = Vec::with_capacity(size);

        for elite in ranked.iter().take(self.params.elitism_count) {
            for _ in 0..self.params.elite_copies {
                next.push(elite.clone());
            }
        }

        let roulette = Roulette::new(ranked);
        while next.len() < size {
            let mum = &ranked[roulette.spin(rng)];
            let dad = &ranked[roulette.spin(rng)];

            let mut child = Genome::crossover(mum, dad, rng, self.params.crossover_rate)?;
            child.mutate(rng, self.params.mutation_rate, self.params.perturbation_scale);
            next.push(child);
        }

        Ok(next)
    }
}

/// Fitness-proportionate selection over a ranked slice.
///
/// Only positive, finite fitness contributes a share of the wheel. Genomes
/// with infinite fitness take every spin between them. When no genome has a
/// share, every genome is equally likely.
struct Roulette {
    cumulative: Vec<f64>,
    total: f64,
    infinite: Vec<usize>,
}

impl Roulette {
    fn new(ranked: &[Genome]) -> Self {
        let infinite = ranked
            .iter()
            .enumerate()
            .filter(|(_, g)| {
                let f = rank_value(g);
                f.is_infinite() && f > 0.0
            })
            .map(|(i, _)| i)
            .collect();

        let mut total = 0.0f64;
        let cumulative = ranked
            .iter()
            .map(|g| {
                let f = rank_value(g);
                if f.is_finite() && f > 0.0 {
                    total += f as f64;
                }
                total
            })
            .collect();

        Self {
            cumulative,
            total,
            infinite,
        }
    }

    fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if !self.infinite.is_empty() {
            return self.infinite[rng.random_range(0..self.infinite.len())];
        }

        let len = self.cumulative.len();
        if !(self.total.is_finite() && self.total > 0.0) {
            return rng.random_range(0..len);
        }

        let slice = rng.random::<f64>() * self.total;
        self.cumulative
            .iter()
            .position(|&c| slice < c)
            .unwrap_or_else(|| self.last_positive())
    }

    /// Guards against `slice` landing on `total` through rounding.
    fn last_positive(&self) -> usize {
        let mut index = 0;
        let mut previous = 0.0;
        for (i, &c) in self.cumulative.iter().enumerate() {
            if c > previous {
                index = i;
            }
            previous = c;
        }
        index
    }
}
