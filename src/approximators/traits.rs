//! Capability interfaces implemented by every approximator.

use std::sync::Arc;

use ndarray::{Array1, Array2};

use crate::core::Array;
use crate::error::{ApproxError, Result};

/// Common interface for all regressors.
///
/// `fit` and `predict` take positional inputs whose meaning is model-specific
/// (for Q-function models: `[state, action, q]` and `[state]`). The optional
/// capabilities default to [`ApproxError::UnsupportedOperation`].
///
/// This trait is object-safe and can be used with `Box<dyn Regressor>`.
pub trait Regressor {
    /// Fit the model on the given inputs.
    fn fit(&mut self, inputs: &[Array]) -> Result<()>;

    /// Predict from the given inputs.
    ///
    /// Returns [`ApproxError::NotFitted`] if the model was never fitted.
    fn predict(&self, inputs: &[Array]) -> Result<Array>;

    /// Re-initialize the model parameters.
    fn reset(&mut self) -> Result<()> {
        Err(ApproxError::UnsupportedOperation(format!(
            "attempt to reset weights of non-parametric regressor {}",
            self.name()
        )))
    }

    /// Number of trainable weights.
    fn weights_size(&self) -> Result<usize> {
        Err(unsupported(self.name(), "weights_size"))
    }

    /// Flattened copy of the trainable weights.
    fn get_weights(&self) -> Result<Array1<f64>> {
        Err(unsupported(self.name(), "get_weights"))
    }

    /// Overwrite the trainable weights from a flat vector.
    fn set_weights(&mut self, weights: &Array1<f64>) -> Result<()> {
        let _ = weights;
        Err(unsupported(self.name(), "set_weights"))
    }

    /// Derivative of the output with respect to the weights.
    fn diff(&self, state: &Array, action: Option<&Array>) -> Result<Array> {
        let _ = (state, action);
        Err(unsupported(self.name(), "diff"))
    }

    /// Model-specific size (weight count, table size, member count).
    fn len(&self) -> usize;

    /// Check if [`Regressor::len`] is zero.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

fn unsupported(name: &str, op: &str) -> ApproxError {
    ApproxError::UnsupportedOperation(format!("{op} is not available for {name}"))
}

/// Type alias for boxed regressor trait objects.
///
/// # Example
///
/// ```
/// use anofox_approximators::approximators::{BoxedRegressor, FromParams, Regressor};
/// use anofox_approximators::regressors::{LinearQ, LinearQParams};
///
/// let model: BoxedRegressor = Box::new(LinearQ::from_params(LinearQParams::new(3, 2)).unwrap());
/// assert_eq!(model.name(), "LinearQ");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedRegressor = Box<dyn Regressor>;

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn fit(&mut self, inputs: &[Array]) -> Result<()> {
        (**self).fit(inputs)
    }

    fn predict(&self, inputs: &[Array]) -> Result<Array> {
        (**self).predict(inputs)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn weights_size(&self) -> Result<usize> {
        (**self).weights_size()
    }

    fn get_weights(&self) -> Result<Array1<f64>> {
        (**self).get_weights()
    }

    fn set_weights(&mut self, weights: &Array1<f64>) -> Result<()> {
        (**self).set_weights(weights)
    }

    fn diff(&self, state: &Array, action: Option<&Array>) -> Result<Array> {
        (**self).diff(state, action)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}

/// Models constructible from a cloneable parameter set.
///
/// An [`Ensemble`](crate::approximators::Ensemble) clones one parameter value
/// per member so that every member starts from identical settings.
pub trait FromParams: Sized {
    type Params: Clone;

    fn from_params(params: Self::Params) -> Result<Self>;
}

/// Models exposing a full `(n_states, n_actions)` action-value table.
pub trait QTable {
    fn q_table(&self) -> Array2<f64>;
}

/// Array-to-array transform applied before fit or predict.
pub trait Preprocessor: Send + Sync {
    fn apply(&self, input: Array) -> Array;
}

impl<F> Preprocessor for F
where
    F: Fn(Array) -> Array + Send + Sync,
{
    fn apply(&self, input: Array) -> Array {
        self(input)
    }
}

/// Preprocessor shared between models built from the same parameters.
pub type SharedPreprocessor = Arc<dyn Preprocessor>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regressors::{LinearQ, LinearQParams, TabularQ, TabularQParams};
    use ndarray::arr1;

    #[test]
    fn boxed_regressor_delegates() {
        let mut model: BoxedRegressor =
            Box::new(LinearQ::from_params(LinearQParams::new(2, 2)).unwrap());
        assert_eq!(model.name(), "LinearQ");
        assert!(!model.is_fitted());
        assert_eq!(model.len(), 4);
        assert_eq!(model.weights_size().unwrap(), 4);

        let state = arr1(&[1.0, 0.0]).into_dyn();
        let action = arr1(&[1.0]).into_dyn();
        let q = arr1(&[2.0]).into_dyn();
        model.fit(&[state.clone(), action, q]).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(&[state]).unwrap().len(), 2);
    }

    #[test]
    fn optional_capabilities_default_to_unsupported() {
        let mut model = TabularQ::from_params(TabularQParams::new(2, 2)).unwrap();
        assert!(matches!(
            model.reset(),
            Err(ApproxError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            model.weights_size(),
            Err(ApproxError::UnsupportedOperation(_))
        ));
        assert!(model.get_weights().is_err());
        assert!(model.set_weights(&arr1(&[0.0])).is_err());
        assert!(model
            .diff(&arr1(&[0.0]).into_dyn(), None)
            .is_err());
    }

    #[test]
    fn closures_are_preprocessors() {
        let double = |x: Array| x * 2.0;
        let out = double.apply(arr1(&[1.0, 2.0]).into_dyn());
        assert_eq!(out, arr1(&[2.0, 4.0]).into_dyn());

        let shared: SharedPreprocessor = Arc::new(|x: Array| x + 1.0);
        assert_eq!(shared.apply(arr1(&[0.0]).into_dyn()), arr1(&[1.0]).into_dyn());
    }
}
