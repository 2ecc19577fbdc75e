//! Tabular action-value model.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::approximators::{FromParams, QTable, Regressor};
use crate::core::{to_indices, Array};
use crate::error::{ApproxError, Result};

/// Parameters for [`TabularQ`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularQParams {
    pub n_states: usize,
    pub n_actions: usize,
    /// Value of every entry before it is first assigned.
    #[serde(default)]
    pub initial_value: f64,
}

impl TabularQParams {
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            initial_value: 0.0,
        }
    }

    pub fn with_initial_value(mut self, initial_value: f64) -> Self {
        self.initial_value = initial_value;
        self
    }
}

/// Lookup table of Q-values indexed by discrete state and action.
///
/// Fitting assigns targets directly: `table[s, a] = q`. The table is not a
/// parametric model, so reset and weight access are unsupported.
#[derive(Debug, Clone)]
pub struct TabularQ {
    table: Array2<f64>,
    fitted: bool,
}

impl TabularQ {
    pub fn n_states(&self) -> usize {
        self.table.nrows()
    }

    pub fn n_actions(&self) -> usize {
        self.table.ncols()
    }

    /// State indices from a scalar, a 1-D index list or a `(batch, 1)` column.
    fn states(&self, state: &Array) -> Result<Vec<usize>> {
        match state.shape() {
            [_, 1] => {}
            [_, cols] => {
                return Err(ApproxError::DimensionMismatch {
                    expected: 1,
                    got: *cols,
                })
            }
            shape if shape.len() > 2 => {
                return Err(ApproxError::InvalidParameter(format!(
                    "state indices must be at most 2-D, got shape {shape:?}"
                )))
            }
            _ => {}
        }
        let states = to_indices(state, "state")?;
        if let Some(&s) = states.iter().find(|&&s| s >= self.n_states()) {
            return Err(ApproxError::IndexOutOfBounds {
                index: s,
                size: self.n_states(),
            });
        }
        Ok(states)
    }
}

impl FromParams for TabularQ {
    type Params = TabularQParams;

    fn from_params(params: TabularQParams) -> Result<Self> {
        if params.n_states == 0 || params.n_actions == 0 {
            return Err(ApproxError::InvalidParameter(
                "n_states and n_actions must be positive".to_string(),
            ));
        }
        Ok(Self {
            table: Array2::from_elem((params.n_states, params.n_actions), params.initial_value),
            fitted: false,
        })
    }
}

impl Regressor for TabularQ {
    /// Expects `[state, action, q]`, one entry per sample.
    fn fit(&mut self, inputs: &[Array]) -> Result<()> {
        let [state, action, q] = inputs else {
            return Err(ApproxError::InvalidArity {
                expected: "3",
                got: inputs.len(),
            });
        };

        let states = self.states(state)?;
        if states.is_empty() {
            return Err(ApproxError::EmptyData);
        }
        let actions = to_indices(action, "action")?;
        for got in [actions.len(), q.len()] {
            if got != states.len() {
                return Err(ApproxError::DimensionMismatch {
                    expected: states.len(),
                    got,
                });
            }
        }
        if let Some(&a) = actions.iter().find(|&&a| a >= self.n_actions()) {
            return Err(ApproxError::IndexOutOfBounds {
                index: a,
                size: self.n_actions(),
            });
        }

        for ((&s, &a), &target) in states.iter().zip(&actions).zip(q.iter()) {
            self.table[[s, a]] = target;
        }
        self.fitted = true;
        Ok(())
    }

    /// One state yields its row; several states yield a (batch, n_actions)
    /// matrix. A 2-D `(batch, 1)` state array is always a batch.
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

        let states = self.states(state)?;
        match states.as_slice() {
            [] => Err(ApproxError::EmptyData),
            &[s] if state.ndim() <= 1 => Ok(self.table.row(s).to_owned().into_dyn()),
            _ => Ok(self.table.select(Axis(0), &states).into_dyn()),
        }
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn name(&self) -> &str {
        "TabularQ"
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

impl QTable for TabularQ {
    fn q_table(&self) -> Array2<f64> {
        self.table.clone()
    }
}
