//! Model training
//!
//! Training loop, evaluation metrics, and hyperparameter sweeps.

pub mod metrics;
pub mod sweep;
pub mod trainer;

pub use metrics::{EpochRecord, EvaluationMetrics, TrainingReport};
pub use sweep::{SweepGrid, SweepRecord, SweepRunner};
pub use trainer::SequenceClassifierTrainer;
