//! On-line training loop over a dataset.
use crate::datasets::TrainingExample;
use crate::error::{NetworkError, Result};
use crate::network::NetworkModel;
use tracing::debug;

/// Outcome of a call to [`train`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    /// Mean per-example error of the last epoch run.
    pub average_error: f64,
    /// Examples per epoch. Zero means nothing was trained.
    pub examples: usize,
    pub epochs: usize,
    /// Mean error of every epoch, in order.
    pub history: Vec<f64>,
}

impl TrainReport {
    pub fn is_empty(&self) -> bool {
        self.examples == 0
    }
}

/// Train `model` for `epochs` passes over `dataset`.
///
/// Each example is a forward pass followed immediately by a backward pass,
/// so later examples see the updates of earlier ones. The returned error is
/// the last epoch's mean, not an average over epochs. An empty dataset is a
/// no-op and reports zero examples.
pub fn train(model: &mut NetworkModel, dataset: &[TrainingExample], epochs: usize) -> Result<TrainReport> {
    if epochs == 0 {
        return Err(NetworkError::InvalidConfig("epochs must be at least 1".into()));
    }
    if dataset.is_empty() {
        debug!("empty dataset, skipping training");
        return Ok(TrainReport::default());
    }

    let mut history = Vec::with_capacity(epochs);
    for epoch in 0..epochs {
        let mut total_error = 0.0;
        for example in dataset {
            model.forward(&example.input)?;
            total_error += model.backward(&example.label)?;
        }
        let avg = total_error / dataset.len() as f64;
        debug!(epoch = epoch + 1, error = avg, "epoch finished");
        history.push(avg);
    }

    Ok(TrainReport {
        average_error: history.last().copied().unwrap_or_default(),
        examples: dataset.len(),
        epochs,
        history,
    })
}
