//! Dataset splits and tensor conversion
//!
//! A split is a pair of parallel sequences: fixed-width feature vectors and
//! binary labels. Splits are caller-owned; the trainer only reads slices.

pub mod synthetic;

use crate::{Result, SchedError};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use std::io::Write;

/// One half of a train/test split: parallel features and labels
#[derive(Debug, Clone, Default)]
pub struct DatasetSplit {
    features: Vec<Vec<f32>>,
    labels: Vec<f32>,
}

impl DatasetSplit {
    /// Create a split, checking that features and labels are parallel
    pub fn new(features: Vec<Vec<f32>>, labels: Vec<f32>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(SchedError::ShapeMismatch {
                context: "split labels".to_string(),
                expected: features.len(),
                actual: labels.len(),
            });
        }
        Ok(DatasetSplit { features, labels })
    }

    /// Check that every feature vector has the configured width
    pub fn check_feature_width(&self, feature_count: usize) -> Result<()> {
        for row in &self.features {
            if row.len() != feature_count {
                return Err(SchedError::ShapeMismatch {
                    context: "feature vector".to_string(),
                    expected: feature_count,
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    pub fn features(&self) -> &[Vec<f32>] {
        &self.features
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Get the number of examples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the split is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Load a split from a CSV file
    ///
    /// Each row is `feature_count` feature columns followed by one label
    /// column. A leading header row is skipped if its first field is not
    /// numeric.
    pub fn from_csv(path: &str, feature_count: usize) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();
            if line_no == 0 && fields[0].trim().parse::<f32>().is_err() {
                continue; // header row
            }

            if fields.len() != feature_count + 1 {
                return Err(SchedError::Parse(format!(
                    "{}:{}: expected {} columns, got {}",
                    path,
                    line_no + 1,
                    feature_count + 1,
                    fields.len()
                )));
            }

            let mut row = Vec::with_capacity(feature_count);
            for field in &fields[..feature_count] {
                let value = field.trim().parse::<f32>().map_err(|e| {
                    SchedError::Parse(format!("{}:{}: {}", path, line_no + 1, e))
                })?;
                row.push(value);
            }
            let label = fields[feature_count].trim().parse::<f32>().map_err(|e| {
                SchedError::Parse(format!("{}:{}: {}", path, line_no + 1, e))
            })?;

            features.push(row);
            labels.push(label);
        }

        DatasetSplit::new(features, labels)
    }

    /// Write the split as a CSV file with a header row
    pub fn save_csv(&self, path: &str) -> Result<()> {
        let mut file = std::fs::File::create(path)?;

        let width = self.features.first().map(|r| r.len()).unwrap_or(0);
        let mut header: Vec<String> = (0..width).map(|i| format!("f{}", i)).collect();
        header.push("label".to_string());
        writeln!(file, "{}", header.join(","))?;

        for (row, label) in self.features.iter().zip(self.labels.iter()) {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(file, "{},{}", cells.join(","), label)?;
        }
        Ok(())
    }
}

/// Converts raw sample slices into batch tensors on a device
#[derive(Clone)]
pub struct TensorBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> TensorBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        TensorBatcher { device }
    }

    /// Build the `[batch, sequence_length, step_dim]` input tensor
    ///
    /// Row-major flattening means each feature vector is split into
    /// `sequence_length` consecutive chunks of `step_dim` values, one per
    /// time step.
    pub fn features(
        &self,
        rows: &[Vec<f32>],
        sequence_length: usize,
        step_dim: usize,
    ) -> Tensor<B, 3> {
        let batch_size = rows.len();
        let mut flat = Vec::with_capacity(batch_size * sequence_length * step_dim);
        for row in rows {
            flat.extend_from_slice(row);
        }

        Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device).reshape([
            batch_size,
            sequence_length,
            step_dim,
        ])
    }

    /// Build the `[batch, 1]` target tensor
    pub fn labels(&self, labels: &[f32]) -> Tensor<B, 2> {
        let batch_size = labels.len();
        Tensor::<B, 1>::from_floats(labels, &self.device).reshape([batch_size, 1])
    }
}
