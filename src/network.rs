//! One-hidden-layer sigmoid network with on-line backpropagation.
use crate::config::{validate_learning_rate, NetworkConfig};
use crate::error::{NetworkError, Result};
use crate::layers::DenseLayer;
use crate::loss::{error_signal, output_error};
use crate::matrix::{self, Matrix};
use rand::Rng;
use std::fmt;

/// Activations recorded by `forward` for the next `backward`.
#[derive(Debug, Clone, PartialEq)]
struct ForwardCache {
    input: Vec<f64>,
    hidden: Vec<f64>,
    output: Vec<f64>,
}

/// Network
#[derive(Debug, Clone)]
pub struct NetworkModel {
    config: NetworkConfig,
    /// input → hidden, `input_size × hidden_size`.
    hidden: DenseLayer,
    /// hidden → output, `hidden_size × output_size`.
    output: DenseLayer,
    cache: Option<ForwardCache>,
}

impl NetworkModel {
    /// Create a model with parameters drawn from the thread RNG.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Create a model with parameters drawn from `rng`, for reproducible runs.
    pub fn with_rng<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let hidden = DenseLayer::new(config.input_size, config.hidden_size, rng);
        let output = DenseLayer::new(config.hidden_size, config.output_size, rng);
        Ok(Self { config, hidden, output, cache: None })
    }

    /// Assemble a model from explicit parameters. Every shape is checked
    /// against `config`.
    pub fn from_parameters(
        config: NetworkConfig,
        weights_input_hidden: Matrix,
        weights_hidden_output: Matrix,
        bias_hidden: Vec<f64>,
        bias_output: Vec<f64>,
    ) -> Result<Self> {
        config.validate()?;
        let hidden = DenseLayer::from_parts(weights_input_hidden, bias_hidden)?;
        let output = DenseLayer::from_parts(weights_hidden_output, bias_output)?;
        let checks = [
            ("weights_input_hidden rows", config.input_size, hidden.input_size()),
            ("hidden size", config.hidden_size, hidden.output_size()),
            ("weights_hidden_output rows", config.hidden_size, output.input_size()),
            ("output size", config.output_size, output.output_size()),
        ];
        for (what, expected, got) in checks {
            if expected != got {
                return Err(NetworkError::dims(what, expected, got));
            }
        }
        if !hidden.is_finite() {
            return Err(NetworkError::NonFiniteParameters("hidden layer"));
        }
        if !output.is_finite() {
            return Err(NetworkError::NonFiniteParameters("output layer"));
        }
        Ok(Self { config, hidden, output, cache: None })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    pub fn set_learning_rate(&mut self, lr: f64) -> Result<()> {
        validate_learning_rate(lr)?;
        self.config.learning_rate = lr;
        Ok(())
    }

    pub fn weights_input_hidden(&self) -> &Matrix {
        &self.hidden.weights
    }

    pub fn weights_hidden_output(&self) -> &Matrix {
        &self.output.weights
    }

    pub fn bias_hidden(&self) -> &[f64] {
        &self.hidden.bias
    }

    pub fn bias_output(&self) -> &[f64] {
        &self.output.bias
    }

    /// Hidden activations from the most recent `forward`, if any.
    pub fn last_hidden_activation(&self) -> Option<&[f64]> {
        self.cache.as_ref().map(|c| c.hidden.as_slice())
    }

    /// Output activations from the most recent `forward`, if any.
    pub fn last_output_activation(&self) -> Option<&[f64]> {
        self.cache.as_ref().map(|c| c.output.as_slice())
    }

    /// Forward pass, recording activations for `backward`.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let (hidden, output) = self.propagate(input)?;
        self.cache = Some(ForwardCache {
            input: input.to_vec(),
            hidden,
            output: output.clone(),
        });
        Ok(output)
    }

    /// Forward pass without touching the cache.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.propagate(input).map(|(_, output)| output)
    }

    fn propagate(&self, input: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        if input.len() != self.config.input_size {
            return Err(NetworkError::dims("input length", self.config.input_size, input.len()));
        }
        let hidden = self.hidden.forward(input)?;
        let output = self.output.forward(&hidden)?;
        Ok((hidden, output))
    }

    /// Backward pass for the example last seen by `forward`.
    ///
    /// Updates both weight matrices in place and returns the example's error
    /// signal (see [`crate::loss::error_signal`]). Biases are left unchanged.
    /// If the step would produce a non-finite weight, nothing is written.
    pub fn backward(&mut self, expected: &[f64]) -> Result<f64> {
        if expected.len() != self.config.output_size {
            return Err(NetworkError::dims("expected length", self.config.output_size, expected.len()));
        }
        let cache = self.cache.take().ok_or_else(|| {
            NetworkError::StatePrecondition("no cached activations; call forward first".into())
        })?;

        let error = output_error(expected, &cache.output)?;
        let output_delta = self.output.deltas(&error, &cache.output);
        // backpropagate through the output weights before they change
        let hidden_error = matrix::multiply_transposed(&self.output.weights, &output_delta)?;
        let hidden_delta = self.hidden.deltas(&hidden_error, &cache.hidden);

        let lr = self.config.learning_rate;
        let new_output = self.output.updated_weights(&cache.hidden, &output_delta, lr);
        let new_hidden = self.hidden.updated_weights(&cache.input, &hidden_delta, lr);
        if !matrix::all_finite(&new_output) {
            return Err(NetworkError::NonFiniteParameters("weights_hidden_output"));
        }
        if !matrix::all_finite(&new_hidden) {
            return Err(NetworkError::NonFiniteParameters("weights_input_hidden"));
        }
        self.output.weights = new_output;
        self.hidden.weights = new_hidden;

        Ok(error_signal(&error))
    }
}

impl fmt::Display for NetworkModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Network: [{}, {}, {}] lr={}",
            self.config.input_size, self.config.hidden_size, self.config.output_size, self.config.learning_rate
        )
    }
}
