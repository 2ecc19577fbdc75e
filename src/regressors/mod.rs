//! Reference regressors with one output per action.
//!
//! `LinearQ` is parametric (weights, reset, gradients); `TabularQ` is a plain
//! lookup table without those capabilities.

mod linear;
mod tabular;

pub use linear::{LinearQ, LinearQParams};
pub use tabular::{TabularQ, TabularQParams};
