//! Classification metrics and run reports

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convert a sigmoid probability to a hard binary prediction
///
/// Threshold is 0.5 via round-to-nearest. `f32::round` rounds half away from
/// zero, so a probability of exactly 0.5 predicts class 1.
pub fn hard_label(prob: f32) -> f32 {
    prob.round()
}

/// Confusion-matrix counts for binary predictions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    /// Tally predictions against true labels
    pub fn from_predictions(predictions: &[f32], labels: &[f32]) -> Self {
        let mut counts = ConfusionCounts::default();
        for (&pred, &label) in predictions.iter().zip(labels.iter()) {
            match (pred >= 0.5, label >= 0.5) {
                (true, true) => counts.true_positives += 1,
                (true, false) => counts.false_positives += 1,
                (false, false) => counts.true_negatives += 1,
                (false, true) => counts.false_negatives += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Fraction of correct predictions, 0.0 on an empty split
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Positive-class precision: TP / (TP + FP), 0.0 on a zero denominator
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Positive-class recall: TP / (TP + FN), 0.0 on a zero denominator
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Macro F1: mean of the per-class F1 scores
    ///
    /// Each per-class F1 is 2PR / (P + R), resolving to 0.0 when the
    /// denominator is zero rather than raising or returning NaN.
    pub fn f1_macro(&self) -> f64 {
        let f1_positive = f1(self.precision(), self.recall());

        // The negative class sees the matrix with the roles swapped
        let negative_precision = ratio(
            self.true_negatives,
            self.true_negatives + self.false_negatives,
        );
        let negative_recall = ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
        );
        let f1_negative = f1(negative_precision, negative_recall);

        (f1_positive + f1_negative) / 2.0
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Final held-out metrics of a training run
///
/// Computed once after the last epoch; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub f1: f64,
    pub recall: f64,
    pub precision: f64,
}

impl EvaluationMetrics {
    pub fn from_counts(counts: &ConfusionCounts) -> Self {
        EvaluationMetrics {
            accuracy: counts.accuracy(),
            f1: counts.f1_macro(),
            recall: counts.recall(),
            precision: counts.precision(),
        }
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Acc: {:.2}% | F1: {:.4} | Recall: {:.4} | Precision: {:.4}",
            self.accuracy * 100.0,
            self.f1,
            self.recall,
            self.precision
        )
    }
}

/// Per-epoch record: index, accumulated loss, wall time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    /// Sum of batch losses over the epoch
    pub loss: f64,
    pub elapsed_secs: f64,
}

/// The sole output contract of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// One record per epoch, in order
    pub epochs: Vec<EpochRecord>,
    /// Exact number of gradient steps applied over the whole run
    pub gradient_steps: usize,
    /// Held-out metrics computed after the final epoch
    pub metrics: EvaluationMetrics,
}

impl TrainingReport {
    /// Loss history as a plain vector
    pub fn epoch_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.loss).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_half_rounds_up_to_positive_class() {
        assert_eq!(hard_label(0.5), 1.0);
        assert_eq!(hard_label(0.49999997), 0.0);
        assert_eq!(hard_label(0.75), 1.0);
    }

    #[test]
    fn counts_tally_all_four_cells() {
        let predictions = [1.0, 1.0, 0.0, 0.0, 1.0];
        let labels = [1.0, 0.0, 0.0, 1.0, 1.0];
        let counts = ConfusionCounts::from_predictions(&predictions, &labels);

        assert_eq!(counts.true_positives, 2);
        assert_eq!(counts.false_positives, 1);
        assert_eq!(counts.true_negatives, 1);
        assert_eq!(counts.false_negatives, 1);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn metrics_match_hand_computed_values() {
        let counts = ConfusionCounts {
            true_positives: 2,
            false_positives: 1,
            true_negatives: 1,
            false_negatives: 1,
        };

        assert!((counts.accuracy() - 0.6).abs() < 1e-12);
        assert!((counts.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((counts.recall() - 2.0 / 3.0).abs() < 1e-12);

        // Positive F1 = 2/3; negative: P = 0.5, R = 0.5 -> F1 = 0.5
        let expected_macro = (2.0 / 3.0 + 0.5) / 2.0;
        assert!((counts.f1_macro() - expected_macro).abs() < 1e-12);
    }

    #[test]
    fn no_positive_labels_gives_zero_recall_not_nan() {
        let predictions = [0.0, 0.0, 1.0];
        let labels = [0.0, 0.0, 0.0];
        let counts = ConfusionCounts::from_predictions(&predictions, &labels);
        let metrics = EvaluationMetrics::from_counts(&counts);

        assert_eq!(metrics.recall, 0.0);
        assert!(!metrics.f1.is_nan());
        assert!(!metrics.precision.is_nan());
    }

    #[test]
    fn perfect_predictions_score_one() {
        let labels = [1.0, 0.0, 1.0, 0.0];
        let counts = ConfusionCounts::from_predictions(&labels, &labels);
        let metrics = EvaluationMetrics::from_counts(&counts);

        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.f1, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.precision, 1.0);
    }

    #[test]
    fn empty_split_yields_zero_metrics() {
        let counts = ConfusionCounts::from_predictions(&[], &[]);
        let metrics = EvaluationMetrics::from_counts(&counts);
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }
}
