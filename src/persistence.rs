//! Model snapshots: JSON documents holding the four parameter arrays.
//!
//! The document layout is
//! `{ weightsInputHidden, weightsHiddenOutput, biasHidden, biasOutput, epoch }`
//! with biases stored as single-row matrices. Files written by the older
//! widget (`weights1`, `weights2`, `bias1`, `bias2`) load as well.
use crate::config::NetworkConfig;
use crate::error::{NetworkError, Result};
use crate::matrix::{self, Matrix};
use crate::network::NetworkModel;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Copies of a model's parameters plus an opaque epoch counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSnapshot")]
pub struct ModelSnapshot {
    pub weights_input_hidden: Matrix,
    pub weights_hidden_output: Matrix,
    pub bias_hidden: Matrix,
    pub bias_output: Matrix,
    pub epoch: u64,
}

/// Deep-copy the model's parameters.
pub fn snapshot(model: &NetworkModel, epoch: u64) -> ModelSnapshot {
    ModelSnapshot {
        weights_input_hidden: model.weights_input_hidden().clone(),
        weights_hidden_output: model.weights_hidden_output().clone(),
        bias_hidden: vec![model.bias_hidden().to_vec()],
        bias_output: vec![model.bias_output().to_vec()],
        epoch,
    }
}

/// Parse a snapshot document. Shapes are not checked here; see
/// [`ModelSnapshot::validate_against`].
pub fn restore(raw: &str) -> Result<ModelSnapshot> {
    serde_json::from_str(raw).map_err(|e| NetworkError::InvalidModelFormat(e.to_string()))
}

impl ModelSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| NetworkError::InvalidModelFormat(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| NetworkError::InvalidModelFormat(e.to_string()))
    }

    /// Gzip-compressed JSON.
    pub fn to_gz_bytes(&self) -> Result<Vec<u8>> {
        let json = self.to_json()?;
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(json.as_bytes())
            .map_err(|e| NetworkError::InvalidModelFormat(format!("gzip: {}", e)))?;
        enc.finish()
            .map_err(|e| NetworkError::InvalidModelFormat(format!("gzip: {}", e)))
    }

    pub fn from_gz_bytes(bytes: &[u8]) -> Result<Self> {
        let mut dec = GzDecoder::new(bytes);
        let mut buf = String::new();
        dec.read_to_string(&mut buf)
            .map_err(|e| NetworkError::InvalidModelFormat(format!("gzip: {}", e)))?;
        restore(&buf)
    }

    /// Topology `(input, hidden, output)` implied by the weight matrices.
    pub fn topology(&self) -> Option<(usize, usize, usize)> {
        let (input, hidden) = matrix::shape(&self.weights_input_hidden)?;
        let (_, output) = matrix::shape(&self.weights_hidden_output)?;
        Some((input, hidden, output))
    }

    /// Check every array against `config` and for finiteness.
    pub fn validate_against(&self, config: &NetworkConfig) -> Result<()> {
        let check = |name: &str, m: &Matrix, rows: usize, cols: usize| -> Result<()> {
            match matrix::shape(m) {
                Some(s) if s == (rows, cols) => {}
                Some((r, c)) => {
                    return Err(NetworkError::InvalidModelFormat(format!(
                        "{} is {}x{}, expected {}x{}",
                        name, r, c, rows, cols
                    )))
                }
                None => return Err(NetworkError::InvalidModelFormat(format!("{} has ragged rows", name))),
            }
            if !matrix::all_finite(m) {
                return Err(NetworkError::InvalidModelFormat(format!("{} contains non-finite values", name)));
            }
            Ok(())
        };
        check("weightsInputHidden", &self.weights_input_hidden, config.input_size, config.hidden_size)?;
        check("weightsHiddenOutput", &self.weights_hidden_output, config.hidden_size, config.output_size)?;
        check("biasHidden", &self.bias_hidden, 1, config.hidden_size)?;
        check("biasOutput", &self.bias_output, 1, config.output_size)?;
        Ok(())
    }

    /// Build a model with `config`'s learning rate from this snapshot.
    pub fn into_model(self, config: NetworkConfig) -> Result<NetworkModel> {
        self.validate_against(&config)?;
        let ModelSnapshot { weights_input_hidden, weights_hidden_output, bias_hidden, bias_output, .. } = self;
        let first_row = |m: Matrix| m.into_iter().next().unwrap_or_default();
        NetworkModel::from_parameters(
            config,
            weights_input_hidden,
            weights_hidden_output,
            first_row(bias_hidden),
            first_row(bias_output),
        )
        .map_err(|e| NetworkError::InvalidModelFormat(e.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BiasRepr {
    Rows(Matrix),
    Flat(Vec<f64>),
}

impl From<BiasRepr> for Matrix {
    fn from(b: BiasRepr) -> Self {
        match b {
            BiasRepr::Rows(m) => m,
            BiasRepr::Flat(v) => vec![v],
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(alias = "weights1")]
    weights_input_hidden: Matrix,
    #[serde(alias = "weights2")]
    weights_hidden_output: Matrix,
    #[serde(alias = "bias1")]
    bias_hidden: BiasRepr,
    #[serde(alias = "bias2")]
    bias_output: BiasRepr,
    #[serde(default)]
    epoch: Option<u64>,
}

impl From<RawSnapshot> for ModelSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self {
            weights_input_hidden: raw.weights_input_hidden,
            weights_hidden_output: raw.weights_hidden_output,
            bias_hidden: raw.bias_hidden.into(),
            bias_output: raw.bias_output.into(),
            epoch: raw.epoch.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn model(seed: u64) -> NetworkModel {
        NetworkModel::with_rng(NetworkConfig::default(), &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn document_uses_camel_case_and_row_biases() {
        let snap = snapshot(&model(1), 42);
        let value: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(value["epoch"], 42);
        assert_eq!(value["biasHidden"].as_array().unwrap().len(), 1);
        assert_eq!(value["biasHidden"][0].as_array().unwrap().len(), 4);
        assert_eq!(value["weightsInputHidden"].as_array().unwrap().len(), 2);
        assert_eq!(value["weightsHiddenOutput"].as_array().unwrap().len(), 4);
        assert!(value.get("biasOutput").is_some());
    }

    #[test]
    fn epoch_defaults_to_zero() {
        let snap = restore(
            r#"{"weightsInputHidden":[[1]],"weightsHiddenOutput":[[2]],"biasHidden":[[0]],"biasOutput":[[0]]}"#,
        )
        .unwrap();
        assert_eq!(snap.epoch, 0);
        let snap = restore(
            &json!({
                "weightsInputHidden": [[1.0]], "weightsHiddenOutput": [[2.0]],
                "biasHidden": [[0.0]], "biasOutput": [[0.0]], "epoch": null
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(snap.epoch, 0);
    }

    #[test]
    fn legacy_field_names_and_flat_biases() {
        let snap = restore(
            &json!({
                "weights1": [[0.1, 0.2]], "weights2": [[0.3], [0.4]],
                "bias1": [0.0, 0.5], "bias2": [[0.25]], "epoch": 7
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(snap.bias_hidden, vec![vec![0.0, 0.5]]);
        assert_eq!(snap.bias_output, vec![vec![0.25]]);
        assert_eq!(snap.topology(), Some((1, 2, 1)));
        assert_eq!(snap.epoch, 7);
    }

    #[test]
    fn malformed_documents_are_invalid_format() {
        for raw in [
            "not json",
            "{}",
            r#"{"weightsHiddenOutput":[[1]],"biasHidden":[[0]],"biasOutput":[[0]]}"#,
            r#"{"weightsInputHidden":"x","weightsHiddenOutput":[[1]],"biasHidden":[[0]],"biasOutput":[[0]]}"#,
        ] {
            assert!(matches!(restore(raw), Err(NetworkError::InvalidModelFormat(_))), "{}", raw);
        }
    }

    #[test]
    fn validation_catches_wrong_shapes() {
        let snap = snapshot(&model(2), 0);
        assert!(snap.validate_against(&NetworkConfig::default()).is_ok());
        let other = NetworkConfig::default().with_hidden_size(6);
        assert!(matches!(snap.validate_against(&other), Err(NetworkError::InvalidModelFormat(_))));
        assert!(snap.into_model(other).is_err());
    }

    #[test]
    fn gzip_round_trip() {
        let snap = snapshot(&model(3), 9);
        let bytes = snap.to_gz_bytes().unwrap();
        assert_eq!(ModelSnapshot::from_gz_bytes(&bytes).unwrap(), snap);
        assert!(ModelSnapshot::from_gz_bytes(b"plain").is_err());
    }

    #[test]
    fn into_model_reproduces_outputs() {
        let original = model(4);
        let restored = snapshot(&original, 0).into_model(*original.config()).unwrap();
        for input in [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]] {
            assert_eq!(original.predict(&input).unwrap(), restored.predict(&input).unwrap());
        }
    }

    proptest! {
        #[test]
        fn json_round_trip(seed in any::<u64>(), epoch in any::<u32>(), hidden in 1usize..9) {
            let config = NetworkConfig::default().with_hidden_size(hidden);
            let m = NetworkModel::with_rng(config, &mut StdRng::seed_from_u64(seed)).unwrap();
            let restored = restore(&snapshot(&m, epoch as u64).to_json().unwrap()).unwrap();
            prop_assert_eq!(restored.epoch, epoch as u64);
            prop_assert_eq!(&restored.weights_input_hidden, m.weights_input_hidden());
            prop_assert_eq!(&restored.weights_hidden_output, m.weights_hidden_output());
            prop_assert_eq!(&restored.bias_hidden[0], &m.bias_hidden().to_vec());
            prop_assert_eq!(&restored.bias_output[0], &m.bias_output().to_vec());
        }
    }
}
