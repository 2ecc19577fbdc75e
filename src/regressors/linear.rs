//! Linear action-value model.
//!
//! Q(s, a) = sum_f s[f] * W[f, a], trained by stochastic gradient descent on
//! the squared error of the taken action.

use ndarray::{Array1, Array2, Ix1};
use serde::{Deserialize, Serialize};

use crate::approximators::{FromParams, Regressor};
use crate::core::{as_batch, to_indices, Array};
use crate::error::{ApproxError, Result};

/// Parameters for [`LinearQ`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearQParams {
    /// Number of state features.
    pub n_features: usize,
    /// Number of discrete actions.
    pub n_actions: usize,
    /// SGD step size.
    pub learning_rate: f64,
}

impl LinearQParams {
    pub fn new(n_features: usize, n_actions: usize) -> Self {
        Self {
            n_features,
            n_actions,
            learning_rate: 0.1,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

/// Linear Q-function over state features.
#[derive(Debug, Clone)]
pub struct LinearQ {
    /// Weights, shape (n_features, n_actions).
    weights: Array2<f64>,
    learning_rate: f64,
    fitted: bool,
}

impl LinearQ {
    pub fn n_features(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_actions(&self) -> usize {
        self.weights.ncols()
    }

    fn single_state(&self, state: &Array) -> Result<Array1<f64>> {
        let state = state.view().into_dimensionality::<Ix1>()?;
        if state.len() != self.n_features() {
            return Err(ApproxError::DimensionMismatch {
                expected: self.n_features(),
                got: state.len(),
            });
        }
        Ok(state.to_owned())
    }
}

impl FromParams for LinearQ {
    type Params = LinearQParams;

    fn from_params(params: LinearQParams) -> Result<Self> {
        if params.n_features == 0 || params.n_actions == 0 {
            return Err(ApproxError::InvalidParameter(
                "n_features and n_actions must be positive".to_string(),
            ));
        }
        if !(params.learning_rate.is_finite() && params.learning_rate > 0.0) {
            return Err(ApproxError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                params.learning_rate
            )));
        }
        Ok(Self {
            weights: Array2::zeros((params.n_features, params.n_actions)),
            learning_rate: params.learning_rate,
            fitted: false,
        })
    }
}

impl Regressor for LinearQ {
    /// Expects `[state, action, q]`; one SGD pass over the batch.
    fn fit(&mut self, inputs: &[Array]) -> Result<()> {
        let [state, action, q] = inputs else {
            return Err(ApproxError::InvalidArity {
                expected: "3",
                got: inputs.len(),
            });
        };

        let states = as_batch(state, self.n_features())?;
        if states.nrows() == 0 {
            return Err(ApproxError::EmptyData);
        }
        let actions = to_indices(action, "action")?;
        if actions.len() != states.nrows() {
            return Err(ApproxError::DimensionMismatch {
                expected: states.nrows(),
                got: actions.len(),
            });
        }
        if q.len() != states.nrows() {
            return Err(ApproxError::DimensionMismatch {
                expected: states.nrows(),
                got: q.len(),
            });
        }
        if let Some(&a) = actions.iter().find(|&&a| a >= self.n_actions()) {
            return Err(ApproxError::IndexOutOfBounds {
                index: a,
                size: self.n_actions(),
            });
        }

        for ((row, &a), &target) in states.outer_iter().zip(&actions).zip(q.iter()) {
            let error = target - row.dot(&self.weights.column(a));
            self.weights
                .column_mut(a)
                .scaled_add(self.learning_rate * error, &row);
        }

        self.fitted = true;
        Ok(())
    }

    fn predict(&self, inputs: &[Array]) -> Result<Array> {
        let [state] = inputs else {
            return Err(ApproxError::InvalidArity {
                expected: "1",
                got: inputs.len(),
            });
        };
        if !self.fitted {
            return Err(ApproxError::NotFitted);
        }

        if state.ndim() == 1 {
            let s = self.single_state(state)?;
            Ok(s.dot(&self.weights).into_dyn())
        } else {
            let batch = as_batch(state, self.n_features())?;
            Ok(batch.dot(&self.weights).into_dyn())
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.weights.fill(0.0);
        self.fitted = false;
        Ok(())
    }

    fn weights_size(&self) -> Result<usize> {
        Ok(self.weights.len())
    }

    /// Row-major flattening of the (n_features, n_actions) weight matrix.
    fn get_weights(&self) -> Result<Array1<f64>> {
        Ok(self.weights.iter().copied().collect())
    }

    fn set_weights(&mut self, weights: &Array1<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(ApproxError::DimensionMismatch {
                expected: self.weights.len(),
                got: weights.len(),
            });
        }
        self.weights = Array2::from_shape_vec(self.weights.raw_dim(), weights.to_vec())?;
        self.fitted = true;
        Ok(())
    }

    /// Gradient of Q with respect to the flattened weights for one state.
    ///
    /// Without an action the full Jacobian of shape (n_weights, n_actions)
    /// is returned.
    fn diff(&self, state: &Array, action: Option<&Array>) -> Result<Array> {
        let s = self.single_state(state)?;
        let n_actions = self.n_actions();

        match action {
            Some(action) => {
                let actions = to_indices(action, "action")?;
                let &[a] = actions.as_slice() else {
                    return Err(ApproxError::DimensionMismatch {
                        expected: 1,
                        got: actions.len(),
                    });
                };
                if a >= n_actions {
                    return Err(ApproxError::IndexOutOfBounds {
                        index: a,
                        size: n_actions,
                    });
                }
                let mut grad = Array1::zeros(self.weights.len());
                for (f, &x) in s.iter().enumerate() {
                    grad[f * n_actions + a] = x;
                }
                Ok(grad.into_dyn())
            }
            None => {
                let mut jacobian = Array2::zeros((self.weights.len(), n_actions));
                for (f, &x) in s.iter().enumerate() {
                    for a in 0..n_actions {
                        jacobian[[f * n_actions + a, a]] = x;
                    }
                }
                Ok(jacobian.into_dyn())
            }
        }
    }

    fn len(&self) -> usize {
        self.weights.len()
    }

    fn name(&self) -> &str {
        "LinearQ"
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn model(n_features: usize, n_actions: usize) -> LinearQ {
        LinearQ::from_params(LinearQParams::new(n_features, n_actions)).unwrap()
    }

    #[test]
    fn linear_invalid_params() {
        assert!(LinearQ::from_params(LinearQParams::new(0, 2)).is_err());
        assert!(LinearQ::from_params(LinearQParams::new(2, 2).with_learning_rate(0.0)).is_err());
        assert!(
            LinearQ::from_params(LinearQParams::new(2, 2).with_learning_rate(f64::NAN)).is_err()
        );
    }

    #[test]
    fn linear_requires_fit() {
        let m = model(2, 2);
        assert_eq!(
            m.predict(&[arr1(&[1.0, 0.0]).into_dyn()]),
            Err(ApproxError::NotFitted)
        );
    }

    #[test]
    fn linear_sgd_step_updates_taken_action_only() {
        let mut m = model(2, 3);
        let state = arr2(&[[1.0, 2.0]]).into_dyn();
        m.fit(&[state.clone(), arr1(&[1.0]).into_dyn(), arr1(&[5.0]).into_dyn()])
            .unwrap();

        // w[:, 1] += 0.1 * (5 - 0) * [1, 2]
        let w = m.get_weights().unwrap();
        assert_eq!(w.len(), 6);
        assert_relative_eq!(w[1], 0.5);
        assert_relative_eq!(w[4], 1.0);
        assert_relative_eq!(w[0], 0.0);
        assert_relative_eq!(w[5], 0.0);

        let q = m.predict(&[state]).unwrap();
        assert_eq!(q.shape(), &[1, 3]);
        assert_relative_eq!(q[[0, 1]], 2.5);
    }

    #[test]
    fn linear_converges_on_repeated_fit() {
        let mut m = LinearQ::from_params(LinearQParams::new(1, 2).with_learning_rate(0.5)).unwrap();
        let state = arr1(&[1.0]).into_dyn();
        for _ in 0..50 {
            m.fit(&[state.clone(), arr1(&[0.0]).into_dyn(), arr1(&[3.0]).into_dyn()])
                .unwrap();
        }
        let q = m.predict(&[state]).unwrap();
        assert_eq!(q.shape(), &[2]);
        assert_relative_eq!(q[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(q[1], 0.0);
    }

    #[test]
    fn linear_fit_validates_batch() {
        let mut m = model(2, 2);
        let states = arr2(&[[1.0, 0.0], [0.0, 1.0]]).into_dyn();
        assert!(matches!(
            m.fit(&[states.clone(), arr1(&[0.0]).into_dyn(), arr1(&[1.0, 1.0]).into_dyn()]),
            Err(ApproxError::DimensionMismatch { .. })
        ));
        assert_eq!(
            m.fit(&[states, arr1(&[0.0, 2.0]).into_dyn(), arr1(&[1.0, 1.0]).into_dyn()]),
            Err(ApproxError::IndexOutOfBounds { index: 2, size: 2 })
        );
        assert!(!m.is_fitted());
    }

    #[test]
    fn linear_weights_round_trip() {
        let mut m = model(2, 2);
        let w = arr1(&[0.5, -1.0, 2.0, 0.25]);
        m.set_weights(&w).unwrap();
        assert!(m.is_fitted());
        assert_eq!(m.get_weights().unwrap(), w);

        let q = m.predict(&[arr1(&[2.0, 4.0]).into_dyn()]).unwrap();
        assert_eq!(q, arr1(&[9.0, -1.0]).into_dyn());

        assert!(matches!(
            m.set_weights(&arr1(&[1.0])),
            Err(ApproxError::DimensionMismatch {
                expected: 4,
                got: 1
            })
        ));
    }

    #[test]
    fn linear_reset() {
        let mut m = model(2, 2);
        m.set_weights(&arr1(&[1.0, 1.0, 1.0, 1.0])).unwrap();
        m.reset().unwrap();
        assert!(!m.is_fitted());
        assert_eq!(m.get_weights().unwrap(), arr1(&[0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn linear_diff() {
        let m = model(2, 2);
        let state = arr1(&[3.0, -1.0]).into_dyn();

        let jac = m.diff(&state, None).unwrap();
        let expected = arr2(&[[3.0, 0.0], [0.0, 3.0], [-1.0, 0.0], [0.0, -1.0]]).into_dyn();
        assert_eq!(jac, expected);

        let grad = m.diff(&state, Some(&arr1(&[0.0]).into_dyn())).unwrap();
        assert_eq!(grad, arr1(&[3.0, 0.0, -1.0, 0.0]).into_dyn());

        assert!(m
            .diff(&state, Some(&arr1(&[0.0, 1.0]).into_dyn()))
            .is_err());
        assert!(m.diff(&arr1(&[1.0]).into_dyn(), None).is_err());
    }

    #[test]
    fn linear_sizes() {
        let m = model(3, 4);
        assert_eq!(m.len(), 12);
        assert_eq!(m.weights_size().unwrap(), 12);
        assert_eq!(m.n_features(), 3);
        assert_eq!(m.n_actions(), 4);
    }
}
