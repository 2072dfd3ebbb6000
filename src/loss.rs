//! Output error and the scalar training signal reported per example.
use crate::error::{NetworkError, Result};

/// `expected[i] - predicted[i]`
pub fn output_error(expected: &[f64], predicted: &[f64]) -> Result<Vec<f64>> {
    if expected.len() != predicted.len() {
        return Err(NetworkError::dims("expected vs predicted length", predicted.len(), expected.len()));
    }
    Ok(expected.iter().zip(predicted).map(|(&e, &p)| e - p).collect())
}

/// Scalar signal for one example.
///
/// Single-output networks report `|error[0]|`. With several outputs the first
/// unit alone would under-report, so the mean absolute error is used instead.
pub fn error_signal(error: &[f64]) -> f64 {
    match error {
        [] => 0.0,
        [only] => only.abs(),
        many => many.iter().map(|e| e.abs()).sum::<f64>() / many.len() as f64,
    }
}
