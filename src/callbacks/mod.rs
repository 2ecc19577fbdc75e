//! Callbacks invoked during a training run.
//!
//! A callback observes the samples collected since its previous call together
//! with the approximator being trained. It never mutates either.

mod collect;
mod summary;

pub use collect::{CollectDataset, CollectMaxQ, CollectQ};
pub use summary::{CollectSummary, JsonLinesWriter, Summary, SummaryWriter};

use crate::core::Transition;
use crate::error::Result;

/// Observer invoked once per collected step or episode.
pub trait Callback<A: ?Sized> {
    fn call(&mut self, dataset: &[Transition], approximator: &A) -> Result<()>;
}
