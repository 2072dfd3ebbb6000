//! Host-facing training session.
//!
//! The host owns the scheduling loop: it calls [`TrainingSession::tick`] once
//! per frame and reschedules only while [`TickOutcome::reschedule`] is true.
//! Every operation that changes topology or loads parameters builds the new
//! model first and swaps it in whole.
use crate::config::NetworkConfig;
use crate::datasets::{parse_dataset, Dataset};
use crate::error::Result;
use crate::metrics::{accuracy, round_prediction};
use crate::network::NetworkModel;
use crate::persistence::{self, ModelSnapshot};
use crate::training::train;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

/// Figures shown next to the network.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionMetrics {
    pub epoch: u64,
    pub error: f64,
    /// Percentage in `[0, 100]`.
    pub accuracy: f64,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Training is paused; nothing ran.
    Idle,
    /// Training is on but there are no valid examples; metrics are unchanged.
    Skipped,
    /// One epoch ran.
    Trained(SessionMetrics),
}

impl TickOutcome {
    /// Whether the host should schedule another tick.
    pub fn reschedule(&self) -> bool {
        !matches!(self, TickOutcome::Idle)
    }
}

/// Raw and rounded output for a manual test input.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub output: Vec<f64>,
    pub rounded: Vec<f64>,
}

#[derive(Debug)]
pub struct TrainingSession {
    config: NetworkConfig,
    model: NetworkModel,
    data_text: String,
    dataset: Dataset,
    training: bool,
    metrics: SessionMetrics,
    rng: StdRng,
}

impl TrainingSession {
    /// Session with an entropy-seeded RNG.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::build(config, StdRng::from_entropy())
    }

    /// Session whose model initialisations are reproducible.
    pub fn with_seed(config: NetworkConfig, seed: u64) -> Result<Self> {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: NetworkConfig, mut rng: StdRng) -> Result<Self> {
        let model = NetworkModel::with_rng(config, &mut rng)?;
        Ok(Self {
            config,
            model,
            data_text: String::new(),
            dataset: Vec::new(),
            training: false,
            metrics: SessionMetrics::default(),
            rng,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn model(&self) -> &NetworkModel {
        &self.model
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn metrics(&self) -> SessionMetrics {
        self.metrics
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Replace the training text and reparse it.
    pub fn set_training_data(&mut self, text: &str) {
        self.data_text = text.to_owned();
        self.dataset = parse_dataset(text, self.config.input_size);
        if self.dataset.is_empty() {
            warn!("training data has no valid rows");
        }
    }

    pub fn start_training(&mut self) {
        if !self.training {
            info!(epoch = self.metrics.epoch, "training started");
        }
        self.training = true;
    }

    pub fn pause_training(&mut self) {
        if self.training {
            info!(epoch = self.metrics.epoch, "training paused");
        }
        self.training = false;
    }

    /// Run one epoch if training is on.
    ///
    /// If an update fails partway through the epoch the error is returned
    /// as-is: updates from the examples before it stay applied, while the
    /// epoch counter and metrics keep their previous values.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if !self.training {
            return Ok(TickOutcome::Idle);
        }
        let report = train(&mut self.model, &self.dataset, 1)?;
        if report.is_empty() {
            return Ok(TickOutcome::Skipped);
        }
        self.metrics = SessionMetrics {
            epoch: self.metrics.epoch + 1,
            error: report.average_error,
            accuracy: accuracy(&self.dataset, &self.model)?,
        };
        Ok(TickOutcome::Trained(self.metrics))
    }

    /// Stop training, clear the counters and start over with a fresh model.
    pub fn reset_model(&mut self, config: NetworkConfig) -> Result<()> {
        let model = NetworkModel::with_rng(config, &mut self.rng)?;
        let reparse = config.input_size != self.config.input_size;
        self.training = false;
        self.config = config;
        self.model = model;
        self.metrics = SessionMetrics::default();
        if reparse {
            let text = std::mem::take(&mut self.data_text);
            self.set_training_data(&text);
        }
        info!(model = %self.model, "model reset");
        Ok(())
    }

    pub fn set_learning_rate(&mut self, lr: f64) -> Result<()> {
        self.model.set_learning_rate(lr)?;
        self.config.learning_rate = lr;
        Ok(())
    }

    /// Rebuild the model with a new hidden size. The learning rate and the
    /// epoch counter carry over.
    pub fn set_hidden_size(&mut self, hidden_size: usize) -> Result<()> {
        let config = self.config.with_hidden_size(hidden_size);
        let model = NetworkModel::with_rng(config, &mut self.rng)?;
        self.config = config;
        self.model = model;
        info!(model = %self.model, "hidden layer resized");
        Ok(())
    }

    /// Forward pass on a single input; the activations stay cached for display.
    pub fn run_inference(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.model.forward(input)
    }

    pub fn test_input(&mut self, input: &[f64]) -> Result<Inference> {
        let output = self.run_inference(input)?;
        let rounded = output.iter().map(|&y| round_prediction(y)).collect();
        Ok(Inference { output, rounded })
    }

    pub fn save_model(&self) -> ModelSnapshot {
        info!(epoch = self.metrics.epoch, "model saved");
        persistence::snapshot(&self.model, self.metrics.epoch)
    }

    /// Parse and install a snapshot document. On failure the current model
    /// and epoch are left untouched.
    pub fn load_model(&mut self, raw: &str) -> Result<()> {
        let snapshot = persistence::restore(raw).map_err(|e| {
            warn!(error = %e, "rejected model file");
            e
        })?;
        self.load_snapshot(snapshot)
    }

    /// Install an already-parsed snapshot. Shapes must match the current
    /// configuration.
    pub fn load_snapshot(&mut self, snapshot: ModelSnapshot) -> Result<()> {
        let epoch = snapshot.epoch;
        let model = snapshot.into_model(self.config).map_err(|e| {
            warn!(error = %e, "rejected model file");
            e
        })?;
        self.model = model;
        self.metrics.epoch = epoch;
        info!(epoch, "model loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    const XOR: &str = "0,0,0\n0,1,1\n1,0,1\n1,1,0";

    fn session() -> TrainingSession {
        let mut s = TrainingSession::with_seed(NetworkConfig::default(), 42).unwrap();
        s.set_training_data(XOR);
        s
    }

    #[test]
    fn idle_until_started() {
        let mut s = session();
        assert_eq!(s.tick().unwrap(), TickOutcome::Idle);
        assert!(!TickOutcome::Idle.reschedule());
        s.start_training();
        match s.tick().unwrap() {
            TickOutcome::Trained(m) => {
                assert_eq!(m.epoch, 1);
                assert!((0.0..=100.0).contains(&m.accuracy));
            }
            other => panic!("unexpected {:?}", other),
        }
        s.pause_training();
        assert_eq!(s.tick().unwrap(), TickOutcome::Idle);
        assert_eq!(s.metrics().epoch, 1);
    }

    #[test]
    fn empty_data_keeps_metrics() {
        let mut s = session();
        s.start_training();
        s.tick().unwrap();
        let before = s.metrics();
        let weights = s.model().weights_input_hidden().clone();
        s.set_training_data("garbage\n1,2");
        let outcome = s.tick().unwrap();
        assert_eq!(outcome, TickOutcome::Skipped);
        assert!(outcome.reschedule());
        assert_eq!(s.metrics(), before);
        assert_eq!(s.model().weights_input_hidden(), &weights);
    }

    #[test]
    fn failed_epoch_keeps_earlier_updates_but_not_metrics() {
        // x = 1e308 with lr = 1e308 overflows the input-to-hidden step
        let config = NetworkConfig::new(2, 4, 1, 1e308);
        let mut s = TrainingSession::with_seed(config, 4).unwrap();
        s.set_training_data("0,0,0\n1e308,1e308,1");
        let output_weights = s.model().weights_hidden_output().clone();
        let hidden_weights = s.model().weights_input_hidden().clone();
        s.start_training();

        let err = s.tick().unwrap_err();
        assert!(matches!(err, NetworkError::NonFiniteParameters(_)));
        assert_eq!(s.metrics(), SessionMetrics::default());
        // the first example's update went through, the second wrote nothing
        assert_ne!(s.model().weights_hidden_output(), &output_weights);
        assert_eq!(s.model().weights_input_hidden(), &hidden_weights);
        assert!(crate::matrix::all_finite(s.model().weights_hidden_output()));
    }

    #[test]
    fn reset_clears_state() {
        let mut s = session();
        s.start_training();
        for _ in 0..3 {
            s.tick().unwrap();
        }
        s.reset_model(NetworkConfig::default().with_hidden_size(3)).unwrap();
        assert!(!s.is_training());
        assert_eq!(s.metrics(), SessionMetrics::default());
        assert_eq!(s.model().bias_hidden().len(), 3);
        assert_eq!(s.dataset().len(), 4);
    }

    #[test]
    fn reset_with_new_input_size_reparses() {
        let mut s = session();
        s.reset_model(NetworkConfig::new(1, 4, 1, 0.5)).unwrap();
        assert_eq!(s.dataset().len(), 4);
        assert_eq!(s.dataset()[1].input, vec![0.0]);
        assert_eq!(s.dataset()[1].label, vec![1.0]);
    }

    #[test]
    fn hidden_size_change_keeps_learning_rate() {
        let mut s = session();
        s.set_learning_rate(1.2).unwrap();
        s.set_hidden_size(6).unwrap();
        assert_eq!(s.model().learning_rate(), 1.2);
        assert_eq!(s.model().weights_input_hidden()[0].len(), 6);
        assert_eq!(s.config().hidden_size, 6);
        assert!(s.set_hidden_size(0).is_err());
        assert_eq!(s.config().hidden_size, 6);
        assert!(s.set_learning_rate(f64::NAN).is_err());
        assert_eq!(s.model().learning_rate(), 1.2);
    }

    #[test]
    fn inference_rounds() {
        let mut s = session();
        let result = s.test_input(&[1.0, 0.0]).unwrap();
        assert_eq!(result.output.len(), 1);
        assert_eq!(result.rounded[0], result.output[0].round());
        assert!(s.model().last_output_activation().is_some());
        assert!(s.run_inference(&[1.0]).is_err());
    }

    #[test]
    fn save_then_load_restores_parameters_and_epoch() {
        let mut s = session();
        s.start_training();
        s.tick().unwrap();
        s.tick().unwrap();
        let saved = s.save_model();
        let raw = saved.to_json().unwrap();
        let expected = s.model().weights_input_hidden().clone();

        s.reset_model(NetworkConfig::default()).unwrap();
        assert_ne!(s.model().weights_input_hidden(), &expected);
        s.load_model(&raw).unwrap();
        assert_eq!(s.model().weights_input_hidden(), &expected);
        assert_eq!(s.metrics().epoch, 2);
    }

    #[test]
    fn failed_load_leaves_model_untouched() {
        let mut s = session();
        s.start_training();
        s.tick().unwrap();
        let weights = s.model().weights_input_hidden().clone();
        let raw = r#"{"weightsHiddenOutput":[[1]],"biasHidden":[[0]],"biasOutput":[[0]],"epoch":99}"#;
        assert!(matches!(s.load_model(raw), Err(NetworkError::InvalidModelFormat(_))));
        assert_eq!(s.model().weights_input_hidden(), &weights);
        assert_eq!(s.metrics().epoch, 1);
    }

    #[test]
    fn load_rejects_shape_mismatch() {
        let mut s = session();
        let other = TrainingSession::with_seed(NetworkConfig::default().with_hidden_size(7), 1).unwrap();
        let raw = other.save_model().to_json().unwrap();
        let weights = s.model().weights_input_hidden().clone();
        assert!(matches!(s.load_model(&raw), Err(NetworkError::InvalidModelFormat(_))));
        assert_eq!(s.model().weights_input_hidden(), &weights);
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let a = TrainingSession::with_seed(NetworkConfig::default(), 9).unwrap();
        let b = TrainingSession::with_seed(NetworkConfig::default(), 9).unwrap();
        assert_eq!(a.model().weights_input_hidden(), b.model().weights_input_hidden());
    }
}
