use anyhow::bail;
use backprop_viz::config::{HIDDEN_SIZE_RANGE, LEARNING_RATE_RANGE};
use backprop_viz::NetworkConfig;
use serde::Deserialize;
use std::path::Path;

/// Settings file format. Every field may be omitted.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub hidden_size: Option<usize>,
    pub learning_rate: Option<f64>,
    pub epochs: Option<usize>,
    pub seed: Option<u64>,
    /// Write gzip-compressed snapshots.
    pub compress: Option<bool>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    // merge configs where the second overwrites the first
    pub fn merge(self, other: Self) -> Self {
        Self {
            hidden_size: other.hidden_size.or(self.hidden_size),
            learning_rate: other.learning_rate.or(self.learning_rate),
            epochs: other.epochs.or(self.epochs),
            seed: other.seed.or(self.seed),
            compress: other.compress.or(self.compress),
        }
    }

    /// Network settings, limited to the ranges the widget's sliders offer.
    pub fn network_config(&self) -> anyhow::Result<NetworkConfig> {
        let defaults = NetworkConfig::default();
        let config = NetworkConfig {
            hidden_size: self.hidden_size.unwrap_or(defaults.hidden_size),
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            ..defaults
        };
        if !HIDDEN_SIZE_RANGE.contains(&config.hidden_size) {
            bail!("hidden size {} outside {:?}", config.hidden_size, HIDDEN_SIZE_RANGE);
        }
        if !LEARNING_RATE_RANGE.contains(&config.learning_rate) {
            bail!("learning rate {} outside {:?}", config.learning_rate, LEARNING_RATE_RANGE);
        }
        Ok(config)
    }
}
