//! Ensembles of independently trained regressors.
//!
//! Each `fit` call trains exactly one member (chosen by index or uniformly at
//! random); predictions of the fitted members are combined elementwise.

mod config;
mod model;

pub use config::{Aggregation, EnsembleConfig, PredictOptions};
pub use model::{Ensemble, EnsemblePrediction};
