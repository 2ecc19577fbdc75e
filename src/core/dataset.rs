//! Samples collected during a run and helpers computed over them.

use ndarray::{Array1, Axis, Ix2};

use super::Array;
use crate::approximators::Regressor;
use crate::error::{ApproxError, Result};

/// One environment step as seen by the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Array1<f64>,
    pub action: usize,
    pub reward: f64,
    pub next_state: Array1<f64>,
    /// The next state is terminal; its value is zero.
    pub absorbing: bool,
    /// Last step of the episode (terminal or truncated).
    pub last: bool,
}

impl Transition {
    pub fn new(
        state: Array1<f64>,
        action: usize,
        reward: f64,
        next_state: Array1<f64>,
        absorbing: bool,
        last: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            absorbing,
            last,
        }
    }
}

/// Episode score statistics over a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scores {
    /// Lowest cumulative episode reward.
    pub min: f64,
    /// Highest cumulative episode reward.
    pub max: f64,
    /// Mean cumulative episode reward.
    pub mean: f64,
    /// Number of completed episodes.
    pub episodes: usize,
}

/// Compute per-episode cumulative rewards and summarize them.
///
/// An episode ends at each transition flagged `last`; rewards after the final
/// `last` flag belong to an incomplete episode and are ignored. With no
/// completed episode every statistic is zero.
pub fn compute_scores(dataset: &[Transition]) -> Scores {
    let mut scores = Vec::new();
    let mut score = 0.0;

    for t in dataset {
        score += t.reward;
        if t.last {
            scores.push(score);
            score = 0.0;
        }
    }

    if scores.is_empty() {
        return Scores::default();
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;

    Scores {
        min,
        max,
        mean,
        episodes: scores.len(),
    }
}

/// Maximum action value and greedy action for each state.
///
/// A 1-D `states` array is a single state. `absorbing` is either empty or
/// holds one flag per state; absorbing states report a maximum value of zero.
/// Ties resolve to the lowest action index.
pub fn max_qa<A>(
    states: &Array,
    absorbing: &[bool],
    approximator: &A,
) -> Result<(Array1<f64>, Array1<usize>)>
where
    A: Regressor + ?Sized,
{
    let batch = if states.ndim() == 1 {
        states.clone().insert_axis(Axis(0))
    } else {
        states.clone()
    };

    let q = approximator.predict(&[batch])?;
    let q = match q.ndim() {
        1 => q.insert_axis(Axis(0)),
        2 => q,
        n => {
            return Err(ApproxError::InvalidParameter(format!(
                "expected 1-D or 2-D action values, got a {n}-D array"
            )))
        }
    };
    let q = q.into_dimensionality::<Ix2>()?;

    if q.ncols() == 0 {
        return Err(ApproxError::EmptyData);
    }
    if !absorbing.is_empty() && absorbing.len() != q.nrows() {
        return Err(ApproxError::DimensionMismatch {
            expected: q.nrows(),
            got: absorbing.len(),
        });
    }

    let mut max_q = Array1::zeros(q.nrows());
    let mut greedy = Array1::zeros(q.nrows());

    for (i, row) in q.outer_iter().enumerate() {
        let mut best = 0;
        for (a, &value) in row.iter().enumerate() {
            if value > row[best] {
                best = a;
            }
        }
        greedy[i] = best;
        max_q[i] = if absorbing.get(i).copied().unwrap_or(false) {
            0.0
        } else {
            row[best]
        };
    }

    Ok((max_q, greedy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regressors::{TabularQ, TabularQParams};
    use crate::approximators::FromParams;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn step(reward: f64, last: bool) -> Transition {
        Transition::new(arr1(&[0.0]), 0, reward, arr1(&[0.0]), false, last)
    }

    #[test]
    fn scores_per_episode() {
        let dataset = vec![
            step(1.0, false),
            step(2.0, true),
            step(-1.0, true),
            step(4.0, false),
            step(0.5, true),
        ];
        let scores = compute_scores(&dataset);
        assert_eq!(scores.episodes, 3);
        assert_relative_eq!(scores.min, -1.0);
        assert_relative_eq!(scores.max, 4.5);
        assert_relative_eq!(scores.mean, 6.5 / 3.0);
    }

    #[test]
    fn scores_ignore_incomplete_episode() {
        let dataset = vec![step(1.0, true), step(100.0, false)];
        let scores = compute_scores(&dataset);
        assert_eq!(scores.episodes, 1);
        assert_relative_eq!(scores.max, 1.0);
    }

    #[test]
    fn scores_without_episodes_are_zero() {
        assert_eq!(compute_scores(&[]), Scores::default());
        assert_eq!(compute_scores(&[step(3.0, false)]), Scores::default());
    }

    fn fitted_table() -> TabularQ {
        let mut table = TabularQ::from_params(TabularQParams::new(2, 3)).unwrap();
        let states = arr1(&[0.0, 0.0, 1.0]).into_dyn();
        let actions = arr1(&[1.0, 2.0, 0.0]).into_dyn();
        let q = arr1(&[5.0, 5.0, -2.0]).into_dyn();
        table.fit(&[states, actions, q]).unwrap();
        table
    }

    #[test]
    fn max_qa_single_state() {
        let table = fitted_table();
        let (max_q, greedy) = max_qa(&arr1(&[0.0]).into_dyn(), &[], &table).unwrap();
        assert_eq!(max_q.len(), 1);
        assert_relative_eq!(max_q[0], 5.0);
        // tie between actions 1 and 2
        assert_eq!(greedy[0], 1);
    }

    #[test]
    fn max_qa_zeroes_absorbing_states() {
        let table = fitted_table();
        let states = arr2(&[[0.0], [1.0]]).into_dyn();
        let (max_q, greedy) = max_qa(&states, &[true, false], &table).unwrap();
        assert_relative_eq!(max_q[0], 0.0);
        assert_relative_eq!(max_q[1], 0.0);
        assert_eq!(greedy[0], 1);
        assert_eq!(greedy[1], 1);
    }

    #[test]
    fn max_qa_checks_absorbing_length() {
        let table = fitted_table();
        let states = arr2(&[[0.0], [1.0]]).into_dyn();
        assert!(matches!(
            max_qa(&states, &[true], &table),
            Err(ApproxError::DimensionMismatch { .. })
        ));
    }
}
