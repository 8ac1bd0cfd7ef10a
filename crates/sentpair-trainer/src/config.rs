//! Trainer hyper-parameters, loadable from JSON and overridable from the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sentpair_core::schedule::DEFAULT_LOSS_TOLERANCE;
use sentpair_core::{Result, SentPairError};

/// Gradient-descent algorithm used for parameter updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adamw,
    Sgd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub lr: f64,
    pub optimizer: OptimizerKind,
    pub weight_decay: f64,
    /// Log the running batch loss every this many batches.
    pub log_interval: usize,
    pub lr_reduce_factor: f64,
    /// Epochs without dev improvement before the learning rate is reduced.
    pub patience: usize,
    /// Dev cross-entropy delta at or below which training stops.
    pub loss_tolerance: f64,
    pub embedding_dim: usize,
    pub hidden_dim: usize,
    /// Sentences are truncated to this many tokens.
    pub max_len: usize,
    /// Whitespace vocabulary drops words seen fewer times than this.
    pub min_count: usize,
    pub seed: u64,
    pub model_outfile: PathBuf,
    pub scalar_log: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 64,
            lr: 0.001,
            optimizer: OptimizerKind::Adamw,
            weight_decay: 0.0,
            log_interval: 10,
            lr_reduce_factor: 0.3,
            patience: 2,
            loss_tolerance: DEFAULT_LOSS_TOLERANCE,
            embedding_dim: 50,
            hidden_dim: 150,
            max_len: 60,
            min_count: 1,
            seed: 1234,
            model_outfile: PathBuf::from("models/sentpair.safetensors"),
            scalar_log: None,
        }
    }
}

impl TrainerConfig {
    /// Reads a (possibly partial) config from a JSON file; missing fields
    /// take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SentPairError::InvalidConfig(msg));
        if self.batch_size == 0 {
            return invalid("batch_size must be positive".into());
        }
        if self.log_interval == 0 {
            return invalid("log_interval must be positive".into());
        }
        if !(self.lr > 0.0) {
            return invalid(format!("lr must be positive, got {}", self.lr));
        }
        if !(self.lr_reduce_factor > 0.0 && self.lr_reduce_factor < 1.0) {
            return invalid(format!(
                "lr_reduce_factor must be in (0, 1), got {}",
                self.lr_reduce_factor
            ));
        }
        if self.embedding_dim == 0 || self.hidden_dim == 0 {
            return invalid("embedding_dim and hidden_dim must be positive".into());
        }
        if self.max_len == 0 {
            return invalid("max_len must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TrainerConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: TrainerConfig =
            serde_json::from_str(r#"{"epochs": 3, "optimizer": "sgd"}"#).unwrap();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.optimizer, OptimizerKind::Sgd);
        assert_eq!(config.batch_size, TrainerConfig::default().batch_size);
    }

    #[test]
    fn rejects_bad_values() {
        let config = TrainerConfig {
            batch_size: 0,
            ..TrainerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TrainerConfig {
            lr_reduce_factor: 1.5,
            ..TrainerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch_size": 8, "patience": 5}"#).unwrap();
        let config = TrainerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.patience, 5);
    }
}
