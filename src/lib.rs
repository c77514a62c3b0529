//! Task-set schedulability prediction using recurrent neural networks
//!
//! A small experimentation harness: a recurrent binary classifier (LSTM or
//! GRU cell) is trained on fixed-width task-set feature vectors and evaluated
//! with the standard four classification metrics.

pub mod data;
pub mod model;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Recurrent cell variant used by the classifier
///
/// Both variants share hyperparameters, training loop, and evaluation; only
/// the cell's internal state-update rule differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Lstm,
    Gru,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Lstm => write!(f, "LSTM"),
            CellKind::Gru => write!(f, "GRU"),
        }
    }
}

impl std::str::FromStr for CellKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lstm" => Ok(CellKind::Lstm),
            "gru" => Ok(CellKind::Gru),
            _ => Err(format!("Unknown cell kind: {}. Use lstm or gru.", s)),
        }
    }
}

/// Weight initialization for the output projection
///
/// `StandardNormal` (unscaled N(0, 1) draws) matches the original harness and
/// stays the default; `XavierNormal` is the variance-scaled alternative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightInit {
    #[default]
    StandardNormal,
    XavierNormal,
}

/// Hyperparameters for one training run
///
/// Created once at trainer construction and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperparams {
    /// Number of passes over the training split
    pub epochs: usize,
    /// Number of output classes (binary classification: fixed at 1)
    pub num_classes: usize,
    /// Width of the recurrent cell's hidden state
    pub hidden_size: usize,
    /// Length of each feature vector
    pub feature_count: usize,
    /// Number of time steps the feature vector is split into
    pub sequence_length: usize,
    /// Number of examples per gradient step
    pub batch_size: usize,
    /// Recurrent cell variant
    pub cell_kind: CellKind,
    /// Output projection initializer
    #[serde(default)]
    pub initializer: WeightInit,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams {
            epochs: 8,
            num_classes: 1,
            hidden_size: 200,
            feature_count: 36,
            sequence_length: 4,
            batch_size: 35,
            cell_kind: CellKind::Lstm,
            initializer: WeightInit::StandardNormal,
        }
    }
}

impl Hyperparams {
    /// Check hyperparameter invariants
    ///
    /// Every count must be positive, `num_classes` must be 1 (the head emits
    /// a single logit fed to a binary cross-entropy), and `feature_count`
    /// must split evenly into `sequence_length` time steps.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(SchedError::Config("epochs must be positive".to_string()));
        }
        if self.hidden_size == 0 {
            return Err(SchedError::Config(
                "hidden_size must be positive".to_string(),
            ));
        }
        if self.feature_count == 0 {
            return Err(SchedError::Config(
                "feature_count must be positive".to_string(),
            ));
        }
        if self.sequence_length == 0 {
            return Err(SchedError::Config(
                "sequence_length must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SchedError::Config(
                "batch_size must be positive".to_string(),
            ));
        }
        if self.num_classes != 1 {
            return Err(SchedError::Config(format!(
                "num_classes must be 1 for binary classification, got {}",
                self.num_classes
            )));
        }
        if self.feature_count % self.sequence_length != 0 {
            return Err(SchedError::Config(format!(
                "feature_count ({}) must be divisible by sequence_length ({})",
                self.feature_count, self.sequence_length
            )));
        }
        Ok(())
    }

    /// Width of one time step after splitting the feature vector
    pub fn step_dim(&self) -> usize {
        self.feature_count / self.sequence_length
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite loss ({loss}) at epoch {epoch}, batch {batch}")]
    NumericalInstability {
        epoch: usize,
        batch: usize,
        loss: f32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SchedError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hyperparams: Hyperparams,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with the training split
    pub train_path: String,
    /// CSV file with the held-out test split
    pub test_path: String,
    /// Optional path for the JSON training report
    pub report_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hyperparams: Hyperparams::default(),
            data: DataConfig {
                train_path: "data/train.csv".to_string(),
                test_path: "data/test.csv".to_string(),
                report_path: None,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchedError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| SchedError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SchedError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
