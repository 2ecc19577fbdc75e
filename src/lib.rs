//! # anofox-approximators
//!
//! Function approximators for reinforcement learning.
//!
//! Provides an ensemble of independently fitted regressors with mean/sum
//! aggregation and sample-variance estimates, a Q-function adapter that
//! answers "all actions" and "taken action" queries over any multi-output
//! regressor, preprocessors, TD action-selection policies and training-run
//! callbacks.
//!
//! # Example
//!
//! ```
//! use anofox_approximators::prelude::*;
//! use anofox_approximators::regressors::{TabularQ, TabularQParams};
//! use ndarray::arr1;
//!
//! let config = EnsembleConfig::new(3).with_seed(0);
//! let params = QRegressorParams::new(TabularQParams::new(4, 2));
//! let mut ensemble: Ensemble<QRegressor<TabularQ>> =
//!     Ensemble::from_params(&config, params).unwrap();
//!
//! let state = arr1(&[1.0]).into_dyn();
//! ensemble
//!     .fit(&[state.clone(), arr1(&[0.0]).into_dyn(), arr1(&[2.5]).into_dyn()])
//!     .unwrap();
//!
//! // only the fitted member contributes
//! let q = ensemble.predict(&[state]).unwrap();
//! assert_eq!(q, arr1(&[2.5, 0.0]).into_dyn());
//! ```

pub mod approximators;
pub mod callbacks;
pub mod core;
pub mod error;
pub mod policy;
pub mod regressors;
pub mod transform;

pub use error::{ApproxError, Result};

pub mod prelude {
    pub use crate::approximators::{
        Aggregation, Ensemble, EnsembleConfig, EnsemblePrediction, FromParams, PredictOptions,
        Preprocessor, QRegressor, QRegressorParams, QTable, Regressor,
    };
    pub use crate::callbacks::Callback;
    pub use crate::core::{Array, Transition};
    pub use crate::error::{ApproxError, Result};
    pub use crate::policy::TdPolicy;
}
