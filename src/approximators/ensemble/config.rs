//! Ensemble configuration and per-call options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ApproxError, Result};

/// Method for combining member predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Aggregation {
    /// Elementwise mean of the member predictions.
    #[default]
    Mean,
    /// Elementwise sum of the member predictions.
    Sum,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Sum => "sum",
        }
    }
}

impl FromStr for Aggregation {
    type Err = ApproxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Aggregation::Mean),
            "sum" => Ok(Aggregation::Sum),
            other => Err(ApproxError::InvalidConfiguration(format!(
                "unknown prediction mode '{other}', expected 'mean' or 'sum'"
            ))),
        }
    }
}

impl TryFrom<String> for Aggregation {
    type Error = ApproxError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Aggregation> for String {
    fn from(a: Aggregation) -> Self {
        a.as_str().to_string()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for building an [`Ensemble`](super::Ensemble).
///
/// # Example
///
/// ```
/// use anofox_approximators::approximators::{Aggregation, EnsembleConfig};
///
/// let config = EnsembleConfig::from_json(r#"{"n_models": 5, "prediction": "sum"}"#).unwrap();
/// assert_eq!(config.n_models, 5);
/// assert_eq!(config.prediction, Aggregation::Sum);
///
/// assert!(EnsembleConfig::from_json(r#"{"n_models": 5, "prediction": "median"}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Number of members.
    pub n_models: usize,
    /// How member predictions are combined.
    #[serde(default)]
    pub prediction: Aggregation,
    /// Seed for random member selection (None for entropy).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            n_models: 1,
            prediction: Aggregation::Mean,
            seed: None,
        }
    }
}

impl EnsembleConfig {
    /// Create a config with the given number of members.
    pub fn new(n_models: usize) -> Self {
        Self {
            n_models,
            ..Default::default()
        }
    }

    /// Set the aggregation method.
    pub fn with_prediction(mut self, prediction: Aggregation) -> Self {
        self.prediction = prediction;
        self
    }

    /// Set random seed for reproducible member selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ApproxError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations without members.
    pub fn validate(&self) -> Result<()> {
        if self.n_models == 0 {
            return Err(ApproxError::InvalidConfiguration(
                "ensemble needs at least one model".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-call prediction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredictOptions {
    /// Predict with this member only.
    pub idx: Option<usize>,
    /// Also return the sample variance across members.
    pub compute_variance: bool,
}

impl PredictOptions {
    /// Predict with a single member.
    pub fn member(idx: usize) -> Self {
        Self {
            idx: Some(idx),
            ..Default::default()
        }
    }

    /// Request the sample variance alongside the aggregate.
    pub fn with_variance(mut self) -> Self {
        self.compute_variance = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_modes() {
        assert_eq!("mean".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert_eq!("sum".parse::<Aggregation>().unwrap(), Aggregation::Sum);
        assert_eq!(Aggregation::Sum.to_string(), "sum");
    }

    #[test]
    fn unknown_mode_is_configuration_error() {
        let err = "median".parse::<Aggregation>().unwrap_err();
        assert!(matches!(err, ApproxError::InvalidConfiguration(_)));
        assert!("Mean".parse::<Aggregation>().is_err());
    }

    #[test]
    fn json_defaults() {
        let config = EnsembleConfig::from_json(r#"{"n_models": 3}"#).unwrap();
        assert_eq!(config, EnsembleConfig::new(3));
    }

    #[test]
    fn json_rejects_unknown_mode() {
        let err = EnsembleConfig::from_json(r#"{"n_models": 3, "prediction": "max"}"#).unwrap_err();
        match err {
            ApproxError::InvalidConfiguration(msg) => assert!(msg.contains("max")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn json_rejects_empty_ensemble() {
        assert!(matches!(
            EnsembleConfig::from_json(r#"{"n_models": 0}"#),
            Err(ApproxError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn json_round_trip() {
        let config = EnsembleConfig::new(4)
            .with_prediction(Aggregation::Sum)
            .with_seed(7);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"sum\""));
        assert_eq!(EnsembleConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn predict_options_builders() {
        assert_eq!(PredictOptions::default().idx, None);
        let opts = PredictOptions::member(2).with_variance();
        assert_eq!(opts.idx, Some(2));
        assert!(opts.compute_variance);
    }
}
