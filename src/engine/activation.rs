//! Scalar activation functions.
//!
//! [`FeedforwardNetwork::feed_forward`](super::network::FeedforwardNetwork::feed_forward)
//! accepts any `Fn(f32) -> f32`, so hosts can pass a closure directly. The
//! [`Activation`] enum names the common choices so they can live in a config file.

use serde::{Deserialize, Serialize};

/// Named activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Hyperbolic tangent, range (-1, 1).
    #[default]
    Tanh,
    /// Logistic sigmoid, range (0, 1).
    Sigmoid,
    /// Rectified linear unit.
    Relu,
    /// Identity.
    Linear,
}

impl Activation {
    /// Applies the activation to a single value.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Tanh => tanh(x),
            Activation::Sigmoid => sigmoid(x),
            Activation::Relu => relu(x),
            Activation::Linear => x,
        }
    }
}

/// Hyperbolic tangent.
#[inline]
pub fn tanh(x: f32) -> f32 {
    x.tanh()
}

/// Logistic sigmoid.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Rectified linear unit. NaN stays NaN.
#[inline]
pub fn relu(x: f32) -> f32 {
    if x < 0.0 { 0.0 } else { x }
}
