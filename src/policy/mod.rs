//! Action-selection policies driven by a Q approximator.

mod td;

pub use td::{Boltzmann, EpsGreedy, TdPolicy};
