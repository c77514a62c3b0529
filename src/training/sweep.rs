//! Hyperparameter grid sweeps
//!
//! Trains one fresh classifier per grid point on shared splits and collects
//! the final metrics, written out as a CSV that external plotting tooling
//! reads (accuracy, f1, precision, recall columns).

use burn::tensor::backend::AutodiffBackend;
use std::io::Write;

use crate::data::DatasetSplit;
use crate::training::metrics::EvaluationMetrics;
use crate::training::trainer::SequenceClassifierTrainer;
use crate::{CellKind, Hyperparams, Result};

/// Axes of the grid; empty axes fall back to the base hyperparameter
#[derive(Debug, Clone, Default)]
pub struct SweepGrid {
    pub hidden_sizes: Vec<usize>,
    pub batch_sizes: Vec<usize>,
    pub epoch_counts: Vec<usize>,
}

impl SweepGrid {
    /// Expand the grid into concrete hyperparameter sets
    pub fn expand(&self, base: &Hyperparams) -> Vec<Hyperparams> {
        let hidden_sizes = fallback(&self.hidden_sizes, base.hidden_size);
        let batch_sizes = fallback(&self.batch_sizes, base.batch_size);
        let epoch_counts = fallback(&self.epoch_counts, base.epochs);

        let mut combos = Vec::new();
        for &hidden_size in &hidden_sizes {
            for &batch_size in &batch_sizes {
                for &epochs in &epoch_counts {
                    combos.push(Hyperparams {
                        hidden_size,
                        batch_size,
                        epochs,
                        ..base.clone()
                    });
                }
            }
        }
        combos
    }
}

fn fallback(axis: &[usize], base: usize) -> Vec<usize> {
    if axis.is_empty() {
        vec![base]
    } else {
        axis.to_vec()
    }
}

/// Result of one grid point
#[derive(Debug, Clone)]
pub struct SweepRecord {
    pub cell_kind: CellKind,
    pub hidden_size: usize,
    pub batch_size: usize,
    pub epochs: usize,
    /// Accumulated loss of the final epoch
    pub final_loss: f64,
    pub metrics: EvaluationMetrics,
}

/// Runs every grid point on the same train/test splits
pub struct SweepRunner<B: AutodiffBackend> {
    device: B::Device,
}

impl<B: AutodiffBackend> SweepRunner<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new(device: B::Device) -> Self {
        SweepRunner { device }
    }

    /// Train and evaluate one classifier per grid point
    pub fn run(
        &self,
        base: &Hyperparams,
        grid: &SweepGrid,
        train: &DatasetSplit,
        test: &DatasetSplit,
    ) -> Result<Vec<SweepRecord>> {
        let combos = grid.expand(base);
        let mut records = Vec::with_capacity(combos.len());

        for params in combos {
            log::info!(
                "Sweep point: cell={}, hidden_size={}, batch_size={}, epochs={}",
                params.cell_kind,
                params.hidden_size,
                params.batch_size,
                params.epochs
            );

            let mut trainer =
                SequenceClassifierTrainer::<B>::new(self.device.clone(), params.clone())?;
            let report = trainer.train(train, test)?;

            log::info!("  {}", report.metrics);

            records.push(SweepRecord {
                cell_kind: params.cell_kind,
                hidden_size: params.hidden_size,
                batch_size: params.batch_size,
                epochs: params.epochs,
                final_loss: report.epoch_losses().last().copied().unwrap_or(0.0),
                metrics: report.metrics,
            });
        }

        Ok(records)
    }
}

/// Write sweep records as a CSV file with a header row
pub fn write_csv(records: &[SweepRecord], path: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "cell,hidden_size,batch_size,epochs,final_loss,accuracy,f1,precision,recall"
    )?;

    for record in records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            record.cell_kind,
            record.hidden_size,
            record.batch_size,
            record.epochs,
            record.final_loss,
            record.metrics.accuracy,
            record.metrics.f1,
            record.metrics.precision,
            record.metrics.recall
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    fn base_params() -> Hyperparams {
        Hyperparams {
            epochs: 1,
            hidden_size: 4,
            feature_count: 4,
            sequence_length: 2,
            batch_size: 2,
            ..Hyperparams::default()
        }
    }

    fn tiny_split(n: usize) -> DatasetSplit {
        let features = (0..n).map(|i| vec![(i % 2) as f32; 4]).collect();
        let labels = (0..n).map(|i| (i % 2) as f32).collect();
        DatasetSplit::new(features, labels).unwrap()
    }

    #[test]
    fn grid_expands_to_cartesian_product() {
        let grid = SweepGrid {
            hidden_sizes: vec![4, 8],
            batch_sizes: vec![2],
            epoch_counts: vec![1, 2, 3],
        };
        let combos = grid.expand(&base_params());
        assert_eq!(combos.len(), 6);
    }

    #[test]
    fn empty_axes_fall_back_to_base() {
        let combos = SweepGrid::default().expand(&base_params());
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].hidden_size, 4);
    }

    #[test]
    fn sweep_produces_one_record_per_point() {
        let device = Default::default();
        let runner = SweepRunner::<TestBackend>::new(device);
        let grid = SweepGrid {
            hidden_sizes: vec![2, 4],
            ..SweepGrid::default()
        };

        let train = tiny_split(4);
        let test = tiny_split(2);
        let records = runner.run(&base_params(), &grid, &train, &test).unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert!((0.0..=1.0).contains(&record.metrics.accuracy));
            assert!(record.final_loss.is_finite());
        }
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let records = vec![SweepRecord {
            cell_kind: CellKind::Gru,
            hidden_size: 8,
            batch_size: 2,
            epochs: 1,
            final_loss: 0.7,
            metrics: EvaluationMetrics {
                accuracy: 0.5,
                f1: 0.5,
                recall: 0.5,
                precision: 0.5,
            },
        }];

        let dir = std::env::temp_dir().join("schedlearn_sweep_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sweep.csv");
        write_csv(&records, path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("cell,hidden_size"));
        assert!(lines[1].starts_with("GRU,8,2,1,"));
    }
}
