//! Dense layer: weights, bias and a sigmoid activation.
use crate::activations::{Activation, Sigmoid};
use crate::error::{NetworkError, Result};
use crate::matrix::{self, Matrix};
use rand::Rng;

/// A fully-connected layer. `weights` is `inputs × outputs`, so a row vector
/// of inputs multiplies it from the left.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    pub weights: Matrix,
    pub bias: Vec<f64>,
    activation: Sigmoid,
}

impl DenseLayer {
    /// Create a new dense layer with weights and bias uniform in `[-1, 1)`.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let weights = matrix::random_matrix(input_size, output_size, rng);
        let bias = (0..output_size).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Self { weights, bias, activation: Sigmoid }
    }

    /// Build a layer from existing parameters. Shapes must agree.
    pub fn from_parts(weights: Matrix, bias: Vec<f64>) -> Result<Self> {
        let (_, cols) = matrix::shape(&weights)
            .ok_or_else(|| NetworkError::DimensionMismatch("ragged weight matrix".into()))?;
        if cols != bias.len() {
            return Err(NetworkError::dims("bias length vs weight columns", cols, bias.len()));
        }
        Ok(Self { weights, bias, activation: Sigmoid })
    }

    pub fn input_size(&self) -> usize {
        self.weights.len()
    }

    pub fn output_size(&self) -> usize {
        self.bias.len()
    }

    /// Forward pass: `a = sigmoid(x·W + b)`.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut z = matrix::multiply(input, &self.weights)?;
        matrix::add_assign(&mut z, &self.bias)?;
        Ok(self.activation.apply_vec(&z))
    }

    /// `delta[i] = error[i] * sigmoid'(a[i])`, using the cached activations.
    pub fn deltas(&self, error: &[f64], activations: &[f64]) -> Vec<f64> {
        error
            .iter()
            .zip(activations)
            .map(|(&e, &a)| e * self.activation.derivative_from_output(a))
            .collect()
    }

    /// Weights after one step: `W[k][j] + lr * input[k] * delta[j]`.
    /// The layer itself is not touched.
    pub fn updated_weights(&self, input: &[f64], delta: &[f64], lr: f64) -> Matrix {
        self.weights
            .iter()
            .zip(input)
            .map(|(row, &x)| row.iter().zip(delta).map(|(&w, &d)| w + lr * x * d).collect())
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        matrix::all_finite(&self.weights) && self.bias.iter().all(|b| b.is_finite())
    }
}
