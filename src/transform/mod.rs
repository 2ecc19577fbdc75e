//! Array preprocessors for states and Q targets.
//!
//! # Example
//!
//! ```
//! use anofox_approximators::approximators::Preprocessor;
//! use anofox_approximators::transform::{Clip, MinMaxScale, Scale};
//! use ndarray::arr1;
//!
//! let rewards = arr1(&[0.0, 2.0, -4.0]).into_dyn();
//! let scaled = Scale::new(0.5).apply(rewards);
//! assert_eq!(scaled, arr1(&[0.0, 1.0, -2.0]).into_dyn());
//!
//! let normalized = MinMaxScale::new(-2.0, 2.0).unwrap().apply(arr1(&[0.0]).into_dyn());
//! assert_eq!(normalized, arr1(&[0.5]).into_dyn());
//!
//! let clipped = Clip::new(-1.0, 1.0).unwrap().apply(arr1(&[-3.0, 0.2]).into_dyn());
//! assert_eq!(clipped, arr1(&[-1.0, 0.2]).into_dyn());
//! ```

pub mod scale;

pub use scale::{Clip, MinMaxScale, Scale, Standardize};
