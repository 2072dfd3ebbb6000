//! Logistic activation used by both layers.
use std::fmt;

/// Activation function interface.
pub trait Activation: fmt::Debug + Send + Sync {
    fn apply(&self, x: f64) -> f64;
    /// Derivative expressed in terms of the activation's own output `y = apply(x)`.
    fn derivative_from_output(&self, y: f64) -> f64;
    fn apply_vec(&self, x: &[f64]) -> Vec<f64> {
        crate::matrix::elementwise_apply(x, |xi| self.apply(xi))
    }
}

/// Sigmoid: 1 / (1 + exp(-x))
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn apply(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
    fn derivative_from_output(&self, y: f64) -> f64 {
        y * (1.0 - y)
    }
}
