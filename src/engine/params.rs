//! Network topology and evolver parameters.

use serde::{Deserialize, Serialize};

use super::error::{EvolutionError, Result};

/// Fixed layer configuration of a feedforward network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Size of the sensor vector.
    pub num_inputs: usize,
    /// Size of the action vector.
    pub num_outputs: usize,
    /// Number of hidden layers (zero connects inputs straight to outputs).
    pub num_hidden_layers: usize,
    /// Neurons in every hidden layer.
    pub neurons_per_hidden_layer: usize,
    /// Constant input fed to every neuron's bias weight.
    pub bias: f32,
}

impl Topology {
    /// Sizes of every layer from input to output.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.num_hidden_layers + 2);
        sizes.push(self.num_inputs);
        sizes.extend(std::iter::repeat_n(
            self.neurons_per_hidden_layer,
            self.num_hidden_layers,
        ));
        sizes.push(self.num_outputs);
        sizes
    }

    /// Total number of weights, bias weights included.
    pub fn weight_count(&self) -> usize {
        self.layer_sizes()
            .windows(2)
            .map(|pair| (pair[0] + 1) * pair[1])
            .sum()
    }

    /// Rejects empty layers.
    pub fn validate(&self) -> Result<()> {
        if self.num_inputs == 0 {
            return Err(EvolutionError::InvalidConfiguration(
                "num_inputs must be positive".to_string(),
            ));
        }
        if self.num_outputs == 0 {
            return Err(EvolutionError::InvalidConfiguration(
                "num_outputs must be positive".to_string(),
            ));
        }
        if self.num_hidden_layers > 0 && self.neurons_per_hidden_layer == 0 {
            return Err(EvolutionError::InvalidConfiguration(
                "neurons_per_hidden_layer must be positive when hidden layers are present"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters that control generational replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolverParams {
    /// Number of genomes in every generation.
    pub population_size: usize,
    /// Per-weight probability of a perturbation.
    pub mutation_rate: f32,
    /// Probability that a pairing is recombined rather than copied.
    pub crossover_rate: f32,
    /// Weights per genome; must equal the network's weight count.
    pub num_weights: usize,
    /// How many of the fittest genomes survive unchanged.
    pub elitism_count: usize,
    /// Copies made of each elite genome.
    pub elite_copies: usize,
    /// Maximum magnitude added to a mutated weight.
    pub perturbation_scale: f32,
    /// Bounds for randomly initialized weights.
    pub init_range: (f32, f32),
}

impl Default for EvolverParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            mutation_rate: 0.1,
            crossover_rate: 0.7,
            num_weights: 0,
            elitism_count: 2,
            elite_copies: 4,
            perturbation_scale: 0.3,
            init_range: (-1.0, 1.0),
        }
    }
}

impl EvolverParams {
    /// Default parameters sized for the given network topology.
    pub fn for_topology(topology: &Topology, population_size: usize) -> Self {
        Self {
            population_size,
            num_weights: topology.weight_count(),
            ..Self::default()
        }
    }

    /// Number of slots filled by elite copies each generation.
    pub fn elite_slots(&self) -> usize {
        self.elitism_count * self.elite_copies
    }

    /// Number of slots filled by crossover and mutation each generation.
    pub fn bred_slots(&self) -> usize {
        self.population_size.saturating_sub(self.elite_slots())
    }

    /// Fails fast on parameters no generation could run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(EvolutionError::InvalidConfiguration(msg));

        if self.population_size == 0 {
            return invalid("population_size must be positive".to_string());
        }
        if self.num_weights == 0 {
            return invalid("num_weights must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid(format!(
                "mutation_rate {} must be within [0, 1]",
                self.mutation_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return invalid(format!(
                "crossover_rate {} must be within [0, 1]",
                self.crossover_rate
            ));
        }
        if self.elitism_count > self.population_size {
            return invalid(format!(
                "elitism_count {} exceeds population_size {}",
                self.elitism_count, self.population_size
            ));
        }
        if self.elite_slots() > self.population_size {
            return invalid(format!(
                "{} elites x {} copies do not fit a population of {}",
                self.elitism_count, self.elite_copies, self.population_size
            ));
        }
        if !(self.perturbation_scale.is_finite() && self.perturbation_scale > 0.0) {
            return invalid(format!(
                "perturbation_scale {} must be positive",
                self.perturbation_scale
            ));
        }
        let (low, high) = self.init_range;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return invalid(format!("init_range ({low}, {high}) is empty"));
        }
        Ok(())
    }
}
