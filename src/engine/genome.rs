//! Genomes: flat weight vectors with a fitness score.
//!
//! A genome is the unit the evolver selects, recombines and mutates. Its weight
//! order is the canonical order of
//! [`FeedforwardNetwork`](super::network::FeedforwardNetwork), so a genome loads
//! straight into a network.

use std::ops::RangeInclusive;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{DecodeError, EvolutionError, Result};

/// Magic bytes at the start of every encoded genome.
const MAGIC: &[u8; 4] = b"NDGN";

/// A candidate solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    weights: Vec<f32>,
    #[serde(default)]
    fitness: Option<f32>,
}

/// Body of the binary encoding, written after [`MAGIC`].
#[derive(Serialize, Deserialize)]
struct EncodedGenome {
    version: u32,
    weights: Vec<f32>,
    fitness: Option<f32>,
}

impl Genome {
    /// Current binary encoding version.
    pub const VERSION: u32 = 1;

    /// Wraps an existing weight vector; fitness starts unset.
    pub fn new(weights: Vec<f32>) -> Self {
        Self {
            weights,
            fitness: None,
        }
    }

    /// Creates a genome with weights drawn uniformly from `range`.
    pub fn random<R: Rng + ?Sized>(
        num_weights: usize,
        rng: &mut R,
        range: RangeInclusive<f32>,
    ) -> Self {
        let weights = (0..num_weights)
            .map(|_| rng.random_range(range.clone()))
            .collect();
        Self::new(weights)
    }

    /// Weights in canonical network order.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of weights.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the genome has no weights.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Recorded fitness, if the host has reported one.
    pub fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    /// Returns this genome with its fitness recorded.
    #[must_use]
    pub fn with_fitness(mut self, fitness: f32) -> Self {
        self.fitness = Some(fitness);
        self
    }

    pub(crate) fn set_fitness(&mut self, fitness: f32) {
        self.fitness = Some(fitness);
    }

    /// Produces one child from two parents.
    ///
    /// With probability `crossover_rate` the child takes `a`'s weights before a
    /// random cut in `[1, len - 1]` and `b`'s weights from the cut on. Otherwise
    /// the child is a copy of `a`. The child's fitness is unset either way.
    pub fn crossover<R: Rng + ?Sized>(
        a: &Genome,
        b: &Genome,
        rng: &mut R,
        crossover_rate: f32,
    ) -> Result<Genome> {
        if a.len() != b.len() {
            return Err(EvolutionError::DimensionMismatch {
                what: "crossover parents",
                expected: a.len(),
                actual: b.len(),
            });
        }

        let recombine = rng.random::<f32>() < crossover_rate;
        if !recombine || a.len() < 2 {
            return Ok(Genome::new(a.weights.clone()));
        }

        let cut = rng.random_range(1..a.len());
        let mut weights = Vec::with_capacity(a.len());
        weights.extend_from_slice(&a.weights[..cut]);
        weights.extend_from_slice(&b.weights[cut..]);

        Ok(Genome::new(weights))
    }

    /// Perturbs each weight with probability `mutation_rate` by up to
    /// `±perturbation_scale`.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mutation_rate: f32,
        perturbation_scale: f32,
    ) {
        for w in &mut self.weights {
            if rng.random::<f32>() < mutation_rate {
                *w += rng.random_range(-1.0f32..=1.0) * perturbation_scale;
            }
        }
    }

    /// Euclidean distance between two weight vectors.
    pub fn distance(a: &Genome, b: &Genome) -> f32 {
        a.weights
            .iter()
            .zip(&b.weights)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    /// Encodes the genome as magic bytes followed by a versioned binary body.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = EncodedGenome {
            version: Self::VERSION,
            weights: self.weights.clone(),
            fitness: self.fitness,
        };
        let encoded = bincode::serialize(&body).map_err(DecodeError::from)?;

        let mut bytes = Vec::with_capacity(MAGIC.len() + encoded.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&encoded);
        Ok(bytes)
    }

    /// Decodes a genome written by [`Genome::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Genome> {
        let body = bytes.strip_prefix(MAGIC.as_slice()).ok_or(DecodeError::BadMagic)?;

        let decoded: EncodedGenome = bincode::deserialize(body).map_err(DecodeError::from)?;
        if decoded.version != Self::VERSION {
            return Err(DecodeError::VersionMismatch {
                expected: Self::VERSION,
                found: decoded.version,
            }
            .into());
        }

        Ok(Genome {
            weights: decoded.weights,
            fitness: decoded.fitness,
        })
    }

    /// Text form of [`Genome::to_bytes`] for sharing a single genome.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Decodes a genome written by [`Genome::to_base64`].
    pub fn from_base64(text: &str) -> Result<Genome> {
        let bytes = STANDARD.decode(text.trim()).map_err(DecodeError::from)?;
        Self::from_bytes(&bytes)
    }
}
