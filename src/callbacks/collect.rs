//! Callbacks that accumulate run data in memory.

use ndarray::Array2;

use super::Callback;
use crate::approximators::{QTable, Regressor};
use crate::core::{max_qa, Array, Transition};
use crate::error::Result;

/// Collects every transition seen during the run.
#[derive(Debug, Clone, Default)]
pub struct CollectDataset {
    dataset: Vec<Transition>,
}

impl CollectDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// All transitions collected so far.
    pub fn get(&self) -> &[Transition] {
        &self.dataset
    }

    pub fn clear(&mut self) {
        self.dataset.clear();
    }
}

impl<A: ?Sized> Callback<A> for CollectDataset {
    fn call(&mut self, dataset: &[Transition], _approximator: &A) -> Result<()> {
        self.dataset.extend_from_slice(dataset);
        Ok(())
    }
}

/// Snapshots the full action-value table at each call.
///
/// For an ensemble the snapshot is the mean of the member tables.
#[derive(Debug, Clone, Default)]
pub struct CollectQ {
    tables: Vec<Array2<f64>>,
}

impl CollectQ {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[Array2<f64>] {
        &self.tables
    }
}

impl<A: QTable + ?Sized> Callback<A> for CollectQ {
    fn call(&mut self, _dataset: &[Transition], approximator: &A) -> Result<()> {
        self.tables.push(approximator.q_table());
        Ok(())
    }
}

/// Tracks the maximum action value of one fixed state.
#[derive(Debug, Clone)]
pub struct CollectMaxQ {
    state: Array,
    max_qs: Vec<f64>,
}

impl CollectMaxQ {
    pub fn new(state: Array) -> Self {
        Self {
            state,
            max_qs: Vec::new(),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.max_qs
    }
}

impl<A: Regressor + ?Sized> Callback<A> for CollectMaxQ {
    fn call(&mut self, _dataset: &[Transition], approximator: &A) -> Result<()> {
        let (max_q, _) = max_qa(&self.state, &[], approximator)?;
        self.max_qs.push(max_q[0]);
        Ok(())
    }
}
