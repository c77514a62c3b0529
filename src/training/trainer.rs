//! Training and evaluation loop for the sequence classifier

use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};
use std::time::Instant;

use crate::data::{DatasetSplit, TensorBatcher};
use crate::model::SequenceClassifier;
use crate::training::metrics::{
    hard_label, ConfusionCounts, EpochRecord, EvaluationMetrics, TrainingReport,
};
use crate::{Hyperparams, Result, SchedError};

/// Adam's default step size; the harness exposes no learning-rate knob
const ADAM_LEARNING_RATE: f64 = 1e-3;

/// Trainer for the recurrent sequence classifier
///
/// Owns the network parameters and the optimizer's moment state for the
/// lifetime of a run. Hyperparameters are validated at construction and
/// never mutated afterwards.
pub struct SequenceClassifierTrainer<B: AutodiffBackend> {
    model: SequenceClassifier<B>,
    optimizer:
        burn::optim::adaptor::OptimizerAdaptor<burn::optim::Adam, SequenceClassifier<B>, B>,
    params: Hyperparams,
    batcher: TensorBatcher<B>,
}

impl<B: AutodiffBackend> SequenceClassifierTrainer<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Create a new trainer, validating the hyperparameters
    pub fn new(device: B::Device, params: Hyperparams) -> Result<Self> {
        params.validate()?;

        let model = SequenceClassifier::new(&device, &params);
        let optimizer = AdamConfig::new().init();

        Ok(SequenceClassifierTrainer {
            model,
            optimizer,
            params,
            batcher: TensorBatcher::new(device),
        })
    }

    /// Train on the training split, then evaluate once on the test split
    ///
    /// Each epoch walks the training split in original order in contiguous
    /// batches of `batch_size`; a trailing remainder smaller than a full
    /// batch is dropped and never trained on. Exactly `epochs` epochs run,
    /// with no early stopping.
    pub fn train(
        &mut self,
        train: &DatasetSplit,
        test: &DatasetSplit,
    ) -> Result<TrainingReport> {
        train.check_feature_width(self.params.feature_count)?;
        test.check_feature_width(self.params.feature_count)?;

        let batch_size = self.params.batch_size;
        let mut epochs = Vec::with_capacity(self.params.epochs);
        let mut gradient_steps = 0usize;

        log::info!(
            "Starting {} training for {} epochs ({} examples, batch size {})",
            self.params.cell_kind,
            self.params.epochs,
            train.len(),
            batch_size
        );

        for epoch in 0..self.params.epochs {
            let start_time = Instant::now();
            let mut epoch_loss = 0.0f64;

            let batches = train
                .features()
                .chunks_exact(batch_size)
                .zip(train.labels().chunks_exact(batch_size));

            for (batch, (batch_x, batch_y)) in batches.enumerate() {
                let x = self
                    .batcher
                    .features(batch_x, self.params.sequence_length, self.params.step_dim());
                let y = self.batcher.labels(batch_y);

                // Forward pass
                let logits = self.model.forward(x);
                let loss = self.binary_cross_entropy(logits, y);
                let loss_val: f32 = loss.clone().into_scalar().elem();

                if !loss_val.is_finite() {
                    return Err(SchedError::NumericalInstability {
                        epoch,
                        batch,
                        loss: loss_val,
                    });
                }

                // Backward pass
                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &self.model);

                // Update weights
                self.model =
                    self.optimizer
                        .step(ADAM_LEARNING_RATE, self.model.clone(), grads);

                epoch_loss += loss_val as f64;
                gradient_steps += 1;
            }

            let elapsed_secs = start_time.elapsed().as_secs_f64();
            log::info!(
                "Epoch {}/{}: loss={:.4} ({:.2}s)",
                epoch + 1,
                self.params.epochs,
                epoch_loss,
                elapsed_secs
            );

            epochs.push(EpochRecord {
                epoch,
                loss: epoch_loss,
                elapsed_secs,
            });
        }

        let metrics = self.evaluate(test)?;
        log::info!("Test metrics: {}", metrics);

        Ok(TrainingReport {
            epochs,
            gradient_steps,
            metrics,
        })
    }

    /// Evaluate on a held-out split in one unbatched forward pass
    ///
    /// Logits pass through a sigmoid and are rounded to hard labels (see
    /// `metrics::hard_label` for the exact-0.5 convention). There are no
    /// stochastic elements: repeated calls on the same trained network and
    /// split yield bit-identical metrics.
    pub fn evaluate(&self, test: &DatasetSplit) -> Result<EvaluationMetrics> {
        test.check_feature_width(self.params.feature_count)?;

        if test.is_empty() {
            return Ok(EvaluationMetrics::from_counts(&ConfusionCounts::default()));
        }

        let x = self.batcher.features(
            test.features(),
            self.params.sequence_length,
            self.params.step_dim(),
        );
        let probs = sigmoid(self.model.forward(x));

        let probs_data = probs.into_data();
        let probs_slice: &[f32] = probs_data.as_slice().unwrap();
        let predictions: Vec<f32> = probs_slice.iter().map(|&p| hard_label(p)).collect();

        let counts = ConfusionCounts::from_predictions(&predictions, test.labels());
        Ok(EvaluationMetrics::from_counts(&counts))
    }

    /// Sigmoid cross-entropy between logits and binary labels, mean-reduced
    fn binary_cross_entropy(&self, logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        let probs = sigmoid(logits);
        let eps = 1e-7;
        let probs_clamped = probs.clamp(eps, 1.0 - eps);
        let loss = targets.clone().neg() * probs_clamped.clone().log()
            - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
        loss.mean()
    }

    /// Hyperparameters this trainer was constructed with
    pub fn params(&self) -> &Hyperparams {
        &self.params
    }
}
