//! Fixed-topology feedforward network.
//!
//! Every layer stores its weights as a `neurons × (fan_in + 1)` matrix. The last
//! column holds each neuron's bias weight, which is multiplied by the topology's
//! constant bias input. Row-major iteration over the layers is the canonical
//! weight order used by [`FeedforwardNetwork::load_weights`] and
//! [`FeedforwardNetwork::extract_weights`].

use ndarray::{Array1, Array2, ArrayView1, s};
use serde::{Deserialize, Serialize};

use super::error::{EvolutionError, Result};
use super::params::Topology;

/// One layer of neurons fed by the previous layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Weight matrix (`neurons` × `fan_in + 1`), bias weight in the last column.
    weights: Array2<f32>,
}

impl Layer {
    /// Creates a layer with all weights zero.
    pub fn zeros(fan_in: usize, neurons: usize) -> Self {
        Self {
            weights: Array2::zeros((neurons, fan_in + 1)),
        }
    }

    /// Number of incoming connections per neuron, excluding the bias.
    pub fn fan_in(&self) -> usize {
        self.weights.ncols() - 1
    }

    /// Number of neurons in this layer.
    pub fn neurons(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of weights held by this layer.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the layer holds no weights.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Read-only view of the weight matrix.
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Computes `activation(W·x + bias·b)` for every neuron.
    #[inline]
    fn forward<F>(&self, inputs: ArrayView1<f32>, bias: f32, activation: &F) -> Array1<f32>
    where
        F: Fn(f32) -> f32,
    {
        let fan_in = self.fan_in();
        let mut output = self.weights.slice(s![.., ..fan_in]).dot(&inputs);
        output.scaled_add(bias, &self.weights.column(fan_in));
        output.mapv_inplace(|x| activation(x));
        output
    }
}

/// A layered network whose shape never changes after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedforwardNetwork {
    topology: Topology,
    layers: Vec<Layer>,
}

impl FeedforwardNetwork {
    /// Creates a network with all weights zero.
    pub fn new(topology: Topology) -> Result<Self> {
        topology.validate()?;

        let layers = topology
            .layer_sizes()
            .windows(2)
            .map(|pair| Layer::zeros(pair[0], pair[1]))
            .collect();

        Ok(Self { topology, layers })
    }

    /// Creates a network and loads the given weights.
    pub fn with_weights(topology: Topology, weights: &[f32]) -> Result<Self> {
        let mut network = Self::new(topology)?;
        network.load_weights(weights)?;
        Ok(network)
    }

    /// The configuration this network was built with.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Layers ordered from the first hidden layer to the output layer.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total number of weights, bias weights included.
    pub fn weight_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Replaces every weight, in canonical order.
    pub fn load_weights(&mut self, weights: &[f32]) -> Result<()> {
        let expected = self.weight_count();
        if weights.len() != expected {
            return Err(EvolutionError::DimensionMismatch {
                what: "weights",
                expected,
                actual: weights.len(),
            });
        }

        let mut offset = 0;
        for layer in &mut self.layers {
            let chunk = &weights[offset..offset + layer.len()];
            for (w, &value) in layer.weights.iter_mut().zip(chunk) {
                *w = value;
            }
            offset += layer.len();
        }

        Ok(())
    }

    /// Returns every weight in canonical order.
    pub fn extract_weights(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.weight_count());
        for layer in &self.layers {
            flat.extend(layer.weights.iter().copied());
        }
        flat
    }

    /// Evaluates the network, writing the output layer into `outputs`.
    ///
    /// Non-finite values produced by `activation` are passed downstream untouched.
    pub fn feed_forward<F>(&self, inputs: &[f32], outputs: &mut [f32], activation: F) -> Result<()>
    where
        F: Fn(f32) -> f32,
    {
        if inputs.len() != self.topology.num_inputs {
            return Err(EvolutionError::DimensionMismatch {
                what: "inputs",
                expected: self.topology.num_inputs,
                actual: inputs.len(),
            });
        }
        if outputs.len() != self.topology.num_outputs {
            return Err(EvolutionError::DimensionMismatch {
                what: "outputs",
                expected: self.topology.num_outputs,
                actual: outputs.len(),
            });
        }

        let bias = self.topology.bias;
        let mut signal = Array1::from(inputs.to_vec());
        for layer in &self.layers {
            signal = layer.forward(signal.view(), bias, &activation);
        }

        for (out, value) in outputs.iter_mut().zip(signal.iter()) {
            *out = *value;
        }

        Ok(())
    }
}
