//! Network definition
//!
//! One recurrent cell followed by a linear projection to a single logit.

pub mod recurrent;

pub use recurrent::SequenceClassifier;
