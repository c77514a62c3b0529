//! Synthetic task-set generation
//!
//! Produces labeled task sets so the harness runs end-to-end without external
//! data. Each example is `sequence_length` tasks with `step_dim` attributes;
//! the first attribute of each task is its utilization share and the label is
//! 1 when the total utilization fits on one processor.

use crate::data::DatasetSplit;
use crate::Hyperparams;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a reproducible split of `n` labeled task sets
///
/// Per-task utilization is drawn uniformly from `[0, 2 / sequence_length)`,
/// so roughly half of the generated sets are schedulable.
pub fn taskset_split(n: usize, params: &Hyperparams, seed: u64) -> DatasetSplit {
    let mut rng = StdRng::seed_from_u64(seed);
    let step_dim = params.step_dim();
    let util_cap = 2.0 / params.sequence_length as f32;

    let mut features = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);

    for _ in 0..n {
        let mut row = Vec::with_capacity(params.feature_count);
        let mut total_util = 0.0f32;

        for _ in 0..params.sequence_length {
            let util = rng.gen_range(0.0..util_cap);
            total_util += util;
            row.push(util);
            for _ in 1..step_dim {
                row.push(rng.gen_range(0.0..1.0));
            }
        }

        features.push(row);
        labels.push(if total_util <= 1.0 { 1.0 } else { 0.0 });
    }

    // Lengths are parallel by construction
    DatasetSplit::new(features, labels).expect("parallel by construction")
}
