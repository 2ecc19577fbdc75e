//! Scaling, normalization and clipping transforms.

use crate::approximators::Preprocessor;
use crate::core::Array;
use crate::error::{ApproxError, Result};

/// Multiply every element by a constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub factor: f64,
}

impl Scale {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Preprocessor for Scale {
    fn apply(&self, input: Array) -> Array {
        input * self.factor
    }
}

/// Min-max normalization of a known range to [0, 1].
///
/// x_scaled = (x - low) / (high - low)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScale {
    low: f64,
    high: f64,
}

impl MinMaxScale {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || high - low < 1e-10 {
            return Err(ApproxError::InvalidParameter(format!(
                "range must satisfy low < high, got [{low}, {high}]"
            )));
        }
        Ok(Self { low, high })
    }

    /// Map a normalized value back to the original range.
    pub fn inverse(&self, input: Array) -> Array {
        input.mapv(|x| x * (self.high - self.low) + self.low)
    }
}

impl Preprocessor for MinMaxScale {
    fn apply(&self, input: Array) -> Array {
        let range = self.high - self.low;
        input.mapv(|x| (x - self.low) / range)
    }
}

/// Standardize with known moments (z-score).
///
/// x_scaled = (x - mean) / std
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardize {
    mean: f64,
    std: f64,
}

impl Standardize {
    pub fn new(mean: f64, std: f64) -> Result<Self> {
        if !mean.is_finite() || !std.is_finite() || std < 1e-10 {
            return Err(ApproxError::InvalidParameter(format!(
                "std must be positive, got {std}"
            )));
        }
        Ok(Self { mean, std })
    }

    /// Estimate the moments from samples (sample standard deviation).
    pub fn fit(samples: &[f64]) -> Result<Self> {
        if samples.len() < 2 {
            return Err(ApproxError::EmptyData);
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Self::new(mean, variance.sqrt())
    }

    pub fn inverse(&self, input: Array) -> Array {
        input.mapv(|x| x * self.std + self.mean)
    }
}

impl Preprocessor for Standardize {
    fn apply(&self, input: Array) -> Array {
        input.mapv(|x| (x - self.mean) / self.std)
    }
}

/// Clamp every element to [min, max].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    min: f64,
    max: f64,
}

impl Clip {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ApproxError::InvalidParameter(format!(
                "clip bounds must satisfy min <= max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }
}

impl Preprocessor for Clip {
    fn apply(&self, input: Array) -> Array {
        input.mapv(|x| x.clamp(self.min, self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    // ==================== Scale ====================

    #[test]
    fn scale_keeps_shape() {
        let x = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let y = Scale::new(-2.0).apply(x);
        assert_eq!(y, arr2(&[[-2.0, -4.0], [-6.0, -8.0]]).into_dyn());
    }

    // ==================== MinMaxScale ====================

    #[test]
    fn min_max_maps_range_to_unit_interval() {
        let s = MinMaxScale::new(10.0, 20.0).unwrap();
        let y = s.apply(arr1(&[10.0, 15.0, 20.0, 25.0]).into_dyn());
        assert_eq!(y, arr1(&[0.0, 0.5, 1.0, 1.5]).into_dyn());
        assert_eq!(s.inverse(y), arr1(&[10.0, 15.0, 20.0, 25.0]).into_dyn());
    }

    #[test]
    fn min_max_rejects_empty_range() {
        assert!(MinMaxScale::new(1.0, 1.0).is_err());
        assert!(MinMaxScale::new(2.0, 1.0).is_err());
        assert!(MinMaxScale::new(f64::NEG_INFINITY, 1.0).is_err());
    }

    // ==================== Standardize ====================

    #[test]
    fn standardize_known_moments() {
        let s = Standardize::new(5.0, 2.0).unwrap();
        let y = s.apply(arr1(&[1.0, 5.0, 9.0]).into_dyn());
        assert_eq!(y, arr1(&[-2.0, 0.0, 2.0]).into_dyn());
    }

    #[test]
    fn standardize_fit_uses_sample_std() {
        let s = Standardize::fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        let z = s.apply(arr1(&[5.0]).into_dyn());
        assert_relative_eq!(z[0], 0.0);

        let back = s.inverse(arr1(&[1.0]).into_dyn());
        assert_relative_eq!(back[0], 5.0 + (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn standardize_rejects_degenerate() {
        assert!(Standardize::new(0.0, 0.0).is_err());
        assert!(Standardize::fit(&[1.0]).is_err());
        assert!(Standardize::fit(&[3.0, 3.0, 3.0]).is_err());
    }

    // ==================== Clip ====================

    #[test]
    fn clip_bounds() {
        let c = Clip::new(-1.0, 1.0).unwrap();
        let y = c.apply(arr1(&[-5.0, -0.5, 0.0, 3.0]).into_dyn());
        assert_eq!(y, arr1(&[-1.0, -0.5, 0.0, 1.0]).into_dyn());
        assert!(Clip::new(1.0, -1.0).is_err());
    }
}
