//! # Neurodroids - Neuroevolution Engine
//!
//! Evolves populations of small feedforward neural networks with a generational
//! genetic algorithm. A host simulation drives the networks, measures one
//! fitness value per agent per generation, and hands those values back to the
//! evolver, which produces the next population.
//!
//! ## Features
//!
//! - Fixed-topology feedforward networks with a constant bias input
//! - Flat weight genomes with single-point crossover and bounded mutation
//! - Elitism with configurable copy counts
//! - Fitness-proportionate parent selection
//! - Deterministic runs from an explicitly passed random generator
//! - Binary and base64 genome encoding, JSON generation records
//!
//! ## Core Modules
//!
//! - [`engine::network`] - Feedforward network evaluation
//! - [`engine::genome`] - Genome representation and genetic operators
//! - [`engine::evolver`] - Generational replacement
//! - [`engine::select`] - Top-N selection used when exporting genomes
//!
//! ## Example
//!
//! ```
//! use neurodroids::engine::activation::tanh;
//! use neurodroids::engine::evolver::Evolver;
//! use neurodroids::engine::network::FeedforwardNetwork;
//! use neurodroids::engine::params::{EvolverParams, Topology};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let topology = Topology {
//!     num_inputs: 2,
//!     num_outputs: 1,
//!     num_hidden_layers: 1,
//!     neurons_per_hidden_layer: 3,
//!     bias: -1.0,
//! };
//! let mut rng = ChaCha8Rng::seed_from_u64(2);
//! let mut evolver = Evolver::new(EvolverParams::for_topology(&topology, 20)).unwrap();
//! evolver.initialize(Vec::new(), &mut rng).unwrap();
//!
//! let mut network = FeedforwardNetwork::new(topology).unwrap();
//! let mut fitness = Vec::new();
//! for genome in evolver.population().unwrap() {
//!     network.load_weights(genome.weights()).unwrap();
//!     let mut out = [0.0];
//!     network.feed_forward(&[0.5, -0.5], &mut out, tanh).unwrap();
//!     fitness.push(out[0]);
//! }
//! evolver.new_generation(&fitness, &mut rng).unwrap();
//! ```

/// The neuroevolution engine.
pub mod engine {
    /// Scalar activation functions.
    pub mod activation;
    /// Error types.
    pub mod error;
    /// Generational genetic algorithm.
    pub mod evolver;
    /// Genome representation and genetic operators.
    pub mod genome;
    /// Feedforward network evaluation.
    pub mod network;
    /// Network topology and evolver parameters.
    pub mod params;
    /// Fixed-size genome collections.
    pub mod population;
    /// Saved generations.
    pub mod record;
    /// Generation length schedule.
    pub mod schedule;
    /// Top-N selection.
    pub mod select;
    /// Per-generation fitness summaries.
    pub mod stats;
}

pub use engine::error::{DecodeError, EvolutionError};
pub use engine::evolver::{Evolver, EvolverState};
pub use engine::genome::Genome;
pub use engine::network::FeedforwardNetwork;
pub use engine::params::{EvolverParams, Topology};
pub use engine::population::Population;
