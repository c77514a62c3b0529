//! Recurrent sequence classifier
//!
//! Feature vectors of length `feature_count` are reshaped into
//! `sequence_length` consecutive chunks and fed through one recurrent cell;
//! the final time step's hidden output is projected to a single logit.

use burn::module::Module;
use burn::nn::gru::{Gru, GruConfig};
use burn::nn::{Initializer, Linear, LinearConfig, Lstm, LstmConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::{CellKind, Hyperparams, WeightInit};

/// The recurrent cell, selected by `Hyperparams::cell_kind`
#[derive(Module, Debug)]
pub enum RecurrentCell<B: Backend> {
    Lstm(Lstm<B>),
    Gru(Gru<B>),
}

impl<B: Backend> RecurrentCell<B> {
    /// Run the sequence through the cell and return per-step hidden states
    fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        match self {
            RecurrentCell::Lstm(lstm) => {
                let (hidden_states, _) = lstm.forward(input, None);
                hidden_states
            }
            RecurrentCell::Gru(gru) => gru.forward(input, None),
        }
    }
}

/// Recurrent binary classifier: one cell plus a logit head
#[derive(Module, Debug)]
pub struct SequenceClassifier<B: Backend> {
    cell: RecurrentCell<B>,
    head: Linear<B>,
    hidden_size: usize,
    sequence_length: usize,
    step_dim: usize,
}

impl<B: Backend> SequenceClassifier<B> {
    /// Create a new classifier from validated hyperparameters
    pub fn new(device: &B::Device, params: &Hyperparams) -> Self {
        let step_dim = params.step_dim();

        let cell = match params.cell_kind {
            CellKind::Lstm => RecurrentCell::Lstm(
                LstmConfig::new(step_dim, params.hidden_size, true).init(device),
            ),
            CellKind::Gru => RecurrentCell::Gru(
                GruConfig::new(step_dim, params.hidden_size, true).init(device),
            ),
        };

        // The head keeps the original harness's unscaled normal draws by
        // default; the cell stays on the framework default.
        let head_init = match params.initializer {
            WeightInit::StandardNormal => Initializer::Normal {
                mean: 0.0,
                std: 1.0,
            },
            WeightInit::XavierNormal => Initializer::XavierNormal { gain: 1.0 },
        };
        let head = LinearConfig::new(params.hidden_size, params.num_classes)
            .with_initializer(head_init)
            .init(device);

        SequenceClassifier {
            cell,
            head,
            hidden_size: params.hidden_size,
            sequence_length: params.sequence_length,
            step_dim,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `input` - Feature batch `[batch, sequence_length, step_dim]`
    ///
    /// # Returns
    /// Logits `[batch, 1]`
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let batch_size = input.dims()[0];

        let hidden_states = self.cell.forward(input);

        // Take only the final time step: [batch, seq, hidden] -> [batch, hidden]
        let last = hidden_states
            .slice([
                0..batch_size,
                self.sequence_length - 1..self.sequence_length,
                0..self.hidden_size,
            ])
            .reshape([batch_size, self.hidden_size]);

        self.head.forward(last)
    }

    /// Width of one time step
    pub fn step_dim(&self) -> usize {
        self.step_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny_params(cell_kind: CellKind) -> Hyperparams {
        Hyperparams {
            hidden_size: 8,
            feature_count: 12,
            sequence_length: 4,
            cell_kind,
            ..Hyperparams::default()
        }
    }

    #[test]
    fn lstm_forward_emits_one_logit_per_example() {
        let device = Default::default();
        let params = tiny_params(CellKind::Lstm);
        let model = SequenceClassifier::<TestBackend>::new(&device, &params);

        let input = Tensor::random(
            [5, params.sequence_length, params.step_dim()],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let logits = model.forward(input);

        assert_eq!(logits.dims(), [5, 1]);
    }

    #[test]
    fn gru_forward_emits_one_logit_per_example() {
        let device = Default::default();
        let params = tiny_params(CellKind::Gru);
        let model = SequenceClassifier::<TestBackend>::new(&device, &params);

        let input = Tensor::random(
            [3, params.sequence_length, params.step_dim()],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let logits = model.forward(input);

        assert_eq!(logits.dims(), [3, 1]);
    }

    #[test]
    fn xavier_initializer_is_accepted() {
        let device = Default::default();
        let params = Hyperparams {
            initializer: crate::WeightInit::XavierNormal,
            ..tiny_params(CellKind::Lstm)
        };
        let model = SequenceClassifier::<TestBackend>::new(&device, &params);

        let input = Tensor::zeros([1, params.sequence_length, params.step_dim()], &device);
        assert_eq!(model.forward(input).dims(), [1, 1]);
    }
}
