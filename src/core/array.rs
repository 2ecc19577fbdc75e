//! Dynamic-rank array helpers.
//!
//! Every approximator consumes and produces `f64` arrays of arbitrary rank.
//! Discrete quantities (actions, tabular states) travel as `f64` values and
//! are converted to indices at the point of use.

use ndarray::{Array2, ArrayD, Axis, Ix1, Ix2};

use crate::error::{ApproxError, Result};

/// Dynamic-rank array of `f64` values.
pub type Array = ArrayD<f64>;

/// Flatten an array of integral values into `usize` indices.
///
/// `what` names the quantity in error messages ("action", "state", ...).
pub fn to_indices(values: &Array, what: &str) -> Result<Vec<usize>> {
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() || v < 0.0 || v.fract() != 0.0 {
                Err(ApproxError::InvalidParameter(format!(
                    "{what} must be a non-negative integer, got {v}"
                )))
            } else {
                Ok(v as usize)
            }
        })
        .collect()
}

/// View a single sample or a batch of samples as a `(batch, n_features)` matrix.
///
/// A 1-D input is promoted to a batch of one.
pub fn as_batch(state: &Array, n_features: usize) -> Result<Array2<f64>> {
    let batch = match state.ndim() {
        1 => state
            .view()
            .into_dimensionality::<Ix1>()?
            .insert_axis(Axis(0))
            .to_owned(),
        2 => state.view().into_dimensionality::<Ix2>()?.to_owned(),
        n => {
            return Err(ApproxError::InvalidParameter(format!(
                "expected a 1-D sample or 2-D batch, got a {n}-D array"
            )))
        }
    };

    if batch.ncols() != n_features {
        return Err(ApproxError::DimensionMismatch {
            expected: n_features,
            got: batch.ncols(),
        });
    }
    Ok(batch)
}
