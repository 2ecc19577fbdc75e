//! Temporal-difference policies.
//!
//! Both policies read the action values of a single state from any
//! [`Regressor`] that answers `predict(&[state])` with one value per action.

use ndarray::{Array1, Ix1, Ix2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::approximators::Regressor;
use crate::core::Array;
use crate::error::{ApproxError, Result};

/// Policy over discrete actions derived from action values.
pub trait TdPolicy {
    /// Probability of each action in `state`.
    fn probabilities<A>(&self, state: &Array, approximator: &A) -> Result<Array1<f64>>
    where
        A: Regressor + ?Sized;

    /// Sample an action in `state`.
    fn draw_action<A, G>(&self, state: &Array, approximator: &A, rng: &mut G) -> Result<usize>
    where
        A: Regressor + ?Sized,
        G: Rng + ?Sized;
}

/// Action values of one state as a 1-D array.
fn action_values<A: Regressor + ?Sized>(state: &Array, approximator: &A) -> Result<Array1<f64>> {
    let q = approximator.predict(std::slice::from_ref(state))?;
    let q = match q.ndim() {
        1 => q.into_dimensionality::<Ix1>()?,
        2 => {
            let q = q.into_dimensionality::<Ix2>()?;
            if q.nrows() != 1 {
                return Err(ApproxError::DimensionMismatch {
                    expected: 1,
                    got: q.nrows(),
                });
            }
            q.row(0).to_owned()
        }
        n => {
            return Err(ApproxError::InvalidParameter(format!(
                "expected action values for one state, got a {n}-D array"
            )))
        }
    };
    if q.is_empty() {
        return Err(ApproxError::EmptyData);
    }
    if q.iter().any(|v| !v.is_finite()) {
        return Err(ApproxError::InvalidParameter(
            "non-finite action values".to_string(),
        ));
    }
    Ok(q)
}

/// Indices of the maximal values.
fn greedy_actions(q: &Array1<f64>) -> Vec<usize> {
    let max = q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    q.iter()
        .enumerate()
        .filter(|(_, &v)| v == max)
        .map(|(a, _)| a)
        .collect()
}

/// Epsilon-greedy policy.
///
/// Explores uniformly with probability epsilon, otherwise picks uniformly
/// among the greedy actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsGreedy {
    epsilon: f64,
}

impl EpsGreedy {
    pub fn new(epsilon: f64) -> Result<Self> {
        validate_epsilon(epsilon)?;
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        validate_epsilon(epsilon)?;
        self.epsilon = epsilon;
        Ok(())
    }
}

fn validate_epsilon(epsilon: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(ApproxError::InvalidParameter(format!(
            "epsilon must be in [0, 1], got {epsilon}"
        )));
    }
    Ok(())
}

impl TdPolicy for EpsGreedy {
    fn probabilities<A>(&self, state: &Array, approximator: &A) -> Result<Array1<f64>>
    where
        A: Regressor + ?Sized,
    {
        let q = action_values(state, approximator)?;
        let greedy = greedy_actions(&q);

        let mut p = Array1::from_elem(q.len(), self.epsilon / q.len() as f64);
        let bonus = (1.0 - self.epsilon) / greedy.len() as f64;
        for a in greedy {
            p[a] += bonus;
        }
        Ok(p)
    }

    fn draw_action<A, G>(&self, state: &Array, approximator: &A, rng: &mut G) -> Result<usize>
    where
        A: Regressor + ?Sized,
        G: Rng + ?Sized,
    {
        let q = action_values(state, approximator)?;
        if rng.gen::<f64>() < self.epsilon {
            return Ok(rng.gen_range(0..q.len()));
        }
        let greedy = greedy_actions(&q);
        Ok(greedy[rng.gen_range(0..greedy.len())])
    }
}

/// Softmax (Boltzmann) policy with inverse temperature `beta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boltzmann {
    beta: f64,
}

impl Boltzmann {
    pub fn new(beta: f64) -> Result<Self> {
        if !(beta.is_finite() && beta >= 0.0) {
            return Err(ApproxError::InvalidParameter(format!(
                "beta must be non-negative, got {beta}"
            )));
        }
        Ok(Self { beta })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl TdPolicy for Boltzmann {
    fn probabilities<A>(&self, state: &Array, approximator: &A) -> Result<Array1<f64>>
    where
        A: Regressor + ?Sized,
    {
        let q = action_values(state, approximator)?;
        let max = q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp = q.mapv(|v| (self.beta * (v - max)).exp());
        let total = exp.sum();
        Ok(exp / total)
    }

    fn draw_action<A, G>(&self, state: &Array, approximator: &A, rng: &mut G) -> Result<usize>
    where
        A: Regressor + ?Sized,
        G: Rng + ?Sized,
    {
        let p = self.probabilities(state, approximator)?;
        let dist = WeightedIndex::<f64>::new(p.iter())
            .map_err(|e| ApproxError::InvalidParameter(e.to_string()))?;
        Ok(dist.sample(rng))
    }
}
