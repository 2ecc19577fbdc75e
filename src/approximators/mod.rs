//! Approximator composition: regressor ensembles and Q-function adapters.

mod traits;

pub mod ensemble;
pub mod q_regressor;

pub use ensemble::{Aggregation, Ensemble, EnsembleConfig, EnsemblePrediction, PredictOptions};
pub use q_regressor::{QRegressor, QRegressorParams};
pub use traits::{BoxedRegressor, FromParams, Preprocessor, QTable, Regressor, SharedPreprocessor};
