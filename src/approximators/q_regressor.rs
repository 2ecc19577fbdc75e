//! Multi-output regressor adapter for Q-functions.
//!
//! The wrapped model outputs one value per action for a state. `QRegressor`
//! preprocesses states and targets and answers both "all action values" and
//! "value of the taken action" queries.

use std::sync::Arc;

use ndarray::{Array1, Array2, Ix1, Ix2};

use crate::approximators::{FromParams, Preprocessor, QTable, Regressor, SharedPreprocessor};
use crate::core::{to_indices, Array};
use crate::error::{ApproxError, Result};

/// Parameters for building a [`QRegressor`].
#[derive(Clone)]
pub struct QRegressorParams<P> {
    /// Transforms applied to states, in order.
    pub input_preprocessors: Vec<SharedPreprocessor>,
    /// Transforms applied to Q targets, in order.
    pub output_preprocessors: Vec<SharedPreprocessor>,
    /// Parameters of the wrapped model.
    pub model: P,
}

impl<P> QRegressorParams<P> {
    /// Parameters for `model` with no preprocessing.
    pub fn new(model: P) -> Self {
        Self {
            input_preprocessors: Vec::new(),
            output_preprocessors: Vec::new(),
            model,
        }
    }

    pub fn with_input_preprocessor<T: Preprocessor + 'static>(mut self, p: T) -> Self {
        self.input_preprocessors.push(Arc::new(p));
        self
    }

    pub fn with_output_preprocessor<T: Preprocessor + 'static>(mut self, p: T) -> Self {
        self.output_preprocessors.push(Arc::new(p));
        self
    }
}

/// Q-function regressor with one output per action.
///
/// # Example
///
/// ```
/// use anofox_approximators::approximators::{FromParams, QRegressor, QRegressorParams};
/// use anofox_approximators::regressors::{TabularQ, TabularQParams};
/// use ndarray::arr1;
///
/// let params = QRegressorParams::new(TabularQParams::new(4, 2));
/// let mut q: QRegressor<TabularQ> = QRegressor::from_params(params).unwrap();
///
/// let state = arr1(&[0.0, 1.0]).into_dyn();
/// q.fit_q(&state, &arr1(&[1.0, 0.0]).into_dyn(), &arr1(&[3.0, -1.0]).into_dyn()).unwrap();
///
/// let taken = q.predict_action(&state, &arr1(&[1.0, 0.0]).into_dyn()).unwrap();
/// assert_eq!(taken, arr1(&[3.0, -1.0]).into_dyn());
/// ```
pub struct QRegressor<R> {
    model: R,
    input_preprocessors: Vec<SharedPreprocessor>,
    output_preprocessors: Vec<SharedPreprocessor>,
}

impl<R: Regressor> QRegressor<R> {
    /// Wrap a model without preprocessing.
    pub fn new(model: R) -> Self {
        Self {
            model,
            input_preprocessors: Vec::new(),
            output_preprocessors: Vec::new(),
        }
    }

    /// Append a state transform.
    pub fn with_input_preprocessor<T: Preprocessor + 'static>(mut self, p: T) -> Self {
        self.input_preprocessors.push(Arc::new(p));
        self
    }

    /// Append a target transform.
    pub fn with_output_preprocessor<T: Preprocessor + 'static>(mut self, p: T) -> Self {
        self.output_preprocessors.push(Arc::new(p));
        self
    }

    /// The wrapped model.
    pub fn model(&self) -> &R {
        &self.model
    }

    /// Mutable access to the wrapped model.
    pub fn model_mut(&mut self) -> &mut R {
        &mut self.model
    }

    fn preprocess_state(&self, state: &Array) -> Array {
        self.input_preprocessors
            .iter()
            .fold(state.clone(), |x, p| p.apply(x))
    }

    fn preprocess_target(&self, q: &Array) -> Array {
        self.output_preprocessors
            .iter()
            .fold(q.clone(), |x, p| p.apply(x))
    }

    /// Fit on states, taken actions and target Q-values.
    pub fn fit_q(&mut self, state: &Array, action: &Array, q: &Array) -> Result<()> {
        let state = self.preprocess_state(state);
        let q = self.preprocess_target(q);
        self.model.fit(&[state, action.clone(), q])
    }

    /// Q-values of every action.
    pub fn predict_all(&self, state: &Array) -> Result<Array> {
        let state = self.preprocess_state(state);
        self.model.predict(&[state])
    }

    /// Q-value of the given action for each state.
    pub fn predict_action(&self, state: &Array, action: &Array) -> Result<Array> {
        let q = self.predict_all(state)?;
        select_actions(q, action)
    }
}

/// Pick `q[action]` from a single state's values, or `q[i, action[i]]` from a
/// batch.
fn select_actions(q: Array, action: &Array) -> Result<Array> {
    let actions = to_indices(action, "action")?;

    match q.ndim() {
        1 => {
            let q = q.into_dimensionality::<Ix1>()?;
            let values = actions
                .iter()
                .map(|&a| {
                    q.get(a).copied().ok_or(ApproxError::IndexOutOfBounds {
                        index: a,
                        size: q.len(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Array1::from(values).into_dyn())
        }
        2 => {
            let q = q.into_dimensionality::<Ix2>()?;
            if actions.len() != q.nrows() {
                return Err(ApproxError::DimensionMismatch {
                    expected: q.nrows(),
                    got: actions.len(),
                });
            }
            let values = q
                .outer_iter()
                .zip(&actions)
                .map(|(row, &a)| {
                    row.get(a).copied().ok_or(ApproxError::IndexOutOfBounds {
                        index: a,
                        size: row.len(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Array1::from(values).into_dyn())
        }
        n => Err(ApproxError::InvalidParameter(format!(
            "cannot select actions from a {n}-D Q output"
        ))),
    }
}

impl<R> FromParams for QRegressor<R>
where
    R: Regressor + FromParams,
{
    type Params = QRegressorParams<R::Params>;

    fn from_params(params: Self::Params) -> Result<Self> {
        Ok(Self {
            model: R::from_params(params.model)?,
            input_preprocessors: params.input_preprocessors,
            output_preprocessors: params.output_preprocessors,
        })
    }
}

impl<R: Regressor> Regressor for QRegressor<R> {
    /// Expects `[state, action, q]`.
    fn fit(&mut self, inputs: &[Array]) -> Result<()> {
        match inputs {
            [state, action, q] => self.fit_q(state, action, q),
            _ => Err(ApproxError::InvalidArity {
                expected: "3",
                got: inputs.len(),
            }),
        }
    }

    /// Expects `[state]` or `[state, action]`.
    fn predict(&self, inputs: &[Array]) -> Result<Array> {
        match inputs {
            [state] => self.predict_all(state),
            [state, action] => self.predict_action(state, action),
            _ => Err(ApproxError::InvalidArity {
                expected: "1 or 2",
                got: inputs.len(),
            }),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.model.reset()
    }

    fn weights_size(&self) -> Result<usize> {
        self.model.weights_size()
    }

    fn get_weights(&self) -> Result<Array1<f64>> {
        self.model.get_weights()
    }

    fn set_weights(&mut self, weights: &Array1<f64>) -> Result<()> {
        self.model.set_weights(weights)
    }

    fn diff(&self, state: &Array, action: Option<&Array>) -> Result<Array> {
        self.model.diff(state, action)
    }

    fn len(&self) -> usize {
        self.model.len()
    }

    fn name(&self) -> &str {
        self.model.name()
    }

    fn is_fitted(&self) -> bool {
        self.model.is_fitted()
    }
}

impl<R: QTable> QTable for QRegressor<R> {
    fn q_table(&self) -> Array2<f64> {
        self.model.q_table()
    }
}
