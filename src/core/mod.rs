//! Core data structures shared by approximators, policies and callbacks.

mod array;
mod dataset;

pub use array::{as_batch, to_indices, Array};
pub use dataset::{compute_scores, max_qa, Scores, Transition};
