//! A one-hidden-layer sigmoid network trained on-line with backpropagation,
//! plus the pieces a host needs to drive it frame by frame.
//!
//! - Row-vector matrix ops and a dense sigmoid layer
//! - Forward/backward passes with per-example weight updates
//! - Text dataset parsing that drops malformed rows
//! - JSON (optionally gzipped) model snapshots
//! - A `TrainingSession` exposing start/pause/reset/load/save to a host UI

pub mod activations;
pub mod config;
pub mod datasets;
pub mod error;
pub mod layers;
pub mod loss;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod persistence;
pub mod session;
pub mod training;
pub mod utils;

pub use activations::{Activation, Sigmoid};
pub use config::NetworkConfig;
pub use datasets::{parse_dataset, Dataset, TrainingExample};
pub use error::{NetworkError, Result};
pub use layers::DenseLayer;
pub use matrix::{elementwise_apply, multiply, Matrix};
pub use metrics::{accuracy, mean_error};
pub use network::NetworkModel;
pub use persistence::{restore, snapshot, ModelSnapshot};
pub use session::{Inference, SessionMetrics, TickOutcome, TrainingSession};
pub use training::{train, TrainReport};
pub use utils::{print_model_summary, print_summary_table, xor_dataset, XOR_TEXT};
