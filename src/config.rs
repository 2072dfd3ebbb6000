//! Network topology and learning rate.
use crate::error::{NetworkError, Result};
use serde::{Deserialize, Serialize};

/// Hidden-layer sizes offered by the host's slider.
pub const HIDDEN_SIZE_RANGE: std::ops::RangeInclusive<usize> = 2..=8;
/// Learning rates offered by the host's slider.
pub const LEARNING_RATE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=2.0;

/// Layer sizes are fixed for the lifetime of a model; `learning_rate` may
/// change between updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub learning_rate: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            input_size: 2,
            hidden_size: 4,
            output_size: 1,
            learning_rate: 0.5,
        }
    }
}

impl NetworkConfig {
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize, learning_rate: f64) -> Self {
        Self { input_size, hidden_size, output_size, learning_rate }
    }

    pub fn with_hidden_size(self, hidden_size: usize) -> Self {
        Self { hidden_size, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("input_size", self.input_size),
            ("hidden_size", self.hidden_size),
            ("output_size", self.output_size),
        ] {
            if size == 0 {
                return Err(NetworkError::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }
        validate_learning_rate(self.learning_rate)
    }
}

pub(crate) fn validate_learning_rate(lr: f64) -> Result<()> {
    if !lr.is_finite() || lr <= 0.0 {
        return Err(NetworkError::InvalidConfig(format!(
            "learning_rate must be finite and positive, got {}",
            lr
        )));
    }
    Ok(())
}
