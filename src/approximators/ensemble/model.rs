//! Ensemble of regressors.
//!
//! Members are built from one factory or parameter set, trained one at a time
//! and queried together. Members that were never fitted are left out of the
//! aggregate; only when no member is fitted does prediction fail.

use std::ops::Index;

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use super::config::{Aggregation, EnsembleConfig, PredictOptions};
use crate::approximators::{FromParams, QTable, Regressor};
use crate::core::Array;
use crate::error::{ApproxError, Result};

/// Aggregated ensemble output.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsemblePrediction {
    /// Mean or sum of the member predictions.
    pub value: Array,
    /// Elementwise sample variance (N-1 denominator) across the members
    /// that contributed, when requested.
    ///
    /// With a single contributing member the variance is undefined and every
    /// element is `NaN`.
    pub variance: Option<Array>,
}

/// Ensemble of independently fitted regressors.
pub struct Ensemble<R> {
    /// The member models.
    models: Vec<R>,
    /// Method for combining member predictions.
    prediction: Aggregation,
    /// Source for random member selection.
    rng: StdRng,
}

impl<R: Regressor> Ensemble<R> {
    /// Create an ensemble whose members are produced by `factory`.
    pub fn new<F>(config: &EnsembleConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut() -> R,
    {
        config.validate()?;
        let models = (0..config.n_models).map(|_| factory()).collect();
        Ok(Self::with_models(models, config))
    }

    /// Create an ensemble of members built from the same parameters.
    pub fn from_params(config: &EnsembleConfig, params: R::Params) -> Result<Self>
    where
        R: FromParams,
    {
        config.validate()?;
        let models = (0..config.n_models)
            .map(|_| R::from_params(params.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_models(models, config))
    }

    fn with_models(models: Vec<R>, config: &EnsembleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            models,
            prediction: config.prediction,
            rng,
        }
    }

    /// Get the combination method.
    pub fn prediction(&self) -> Aggregation {
        self.prediction
    }

    /// Get the number of models in the ensemble.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// All members, in construction order.
    pub fn models(&self) -> &[R] {
        &self.models
    }

    /// Member `idx`, if it exists.
    pub fn get(&self, idx: usize) -> Option<&R> {
        self.models.get(idx)
    }

    /// Mutable access to member `idx`.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut R> {
        self.models.get_mut(idx)
    }

    fn check_index(&self, idx: usize) -> Result<usize> {
        if idx >= self.models.len() {
            return Err(ApproxError::IndexOutOfBounds {
                index: idx,
                size: self.models.len(),
            });
        }
        Ok(idx)
    }

    /// Fit member `idx`, or a uniformly random member when `idx` is `None`.
    pub fn fit_with(&mut self, inputs: &[Array], idx: Option<usize>) -> Result<()> {
        let idx = match idx {
            Some(idx) => self.check_index(idx)?,
            None => self.rng.gen_range(0..self.models.len()),
        };
        debug!(member = idx, members = self.models.len(), "fitting ensemble member");
        self.models[idx].fit(inputs)
    }

    /// Predict with one member or with the whole ensemble.
    pub fn predict_with(
        &self,
        inputs: &[Array],
        options: &PredictOptions,
    ) -> Result<EnsemblePrediction> {
        if let Some(idx) = options.idx {
            let idx = self.check_index(idx)?;
            return Ok(EnsemblePrediction {
                value: self.models[idx].predict(inputs)?,
                variance: None,
            });
        }

        let mut predictions = Vec::with_capacity(self.models.len());
        for (i, model) in self.models.iter().enumerate() {
            match model.predict(inputs) {
                Ok(p) => predictions.push(p),
                Err(ApproxError::NotFitted) => trace!(member = i, "skipping unfitted member"),
                Err(e) => return Err(e),
            }
        }

        if predictions.is_empty() {
            return Err(ApproxError::NotFitted);
        }

        self.combine(&predictions, options.compute_variance)
    }

    fn combine(&self, predictions: &[Array], compute_variance: bool) -> Result<EnsemblePrediction> {
        let views: Vec<_> = predictions.iter().map(|p| p.view()).collect();
        let stacked = ndarray::stack(Axis(0), &views)?;

        let value = match self.prediction {
            Aggregation::Mean => stacked.mean_axis(Axis(0)).ok_or(ApproxError::EmptyData)?,
            Aggregation::Sum => stacked.sum_axis(Axis(0)),
        };

        let variance = if !compute_variance {
            None
        } else if predictions.len() > 1 {
            Some(stacked.var_axis(Axis(0), 1.0))
        } else {
            warn!("sample variance undefined for a single fitted member, returning NaN");
            Some(Array::from_elem(value.raw_dim(), f64::NAN))
        };

        Ok(EnsemblePrediction { value, variance })
    }
}

impl<R: Regressor> Regressor for Ensemble<R> {
    fn fit(&mut self, inputs: &[Array]) -> Result<()> {
        self.fit_with(inputs, None)
    }

    fn predict(&self, inputs: &[Array]) -> Result<Array> {
        self.predict_with(inputs, &PredictOptions::default())
            .map(|p| p.value)
    }

    /// Reset every member.
    ///
    /// All members are attempted even after a failure, so members that can
    /// reset always end up reset. The first error encountered is returned.
    fn reset(&mut self) -> Result<()> {
        debug!(members = self.models.len(), "resetting ensemble");
        let mut first_err = None;
        for (i, model) in self.models.iter_mut().enumerate() {
            if let Err(e) = model.reset() {
                trace!(member = i, error = %e, "member reset failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn len(&self) -> usize {
        self.models.len()
    }

    fn name(&self) -> &str {
        match self.prediction {
            Aggregation::Mean => "Ensemble (Mean)",
            Aggregation::Sum => "Ensemble (Sum)",
        }
    }

    fn is_fitted(&self) -> bool {
        self.models.iter().any(|m| m.is_fitted())
    }
}

impl<R> Index<usize> for Ensemble<R> {
    type Output = R;

    fn index(&self, idx: usize) -> &R {
        &self.models[idx]
    }
}

/// Mean of the member tables.
impl<R: QTable> QTable for Ensemble<R> {
    fn q_table(&self) -> Array2<f64> {
        let mut tables = self.models.iter().map(|m| m.q_table());
        let mut total = match tables.next() {
            Some(t) => t,
            None => return Array2::zeros((0, 0)),
        };
        for t in tables {
            total += &t;
        }
        total / self.models.len() as f64
    }
}
