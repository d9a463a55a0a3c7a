//! Statistical primitives for the city-guessing analysis.
//!
//! This crate provides:
//!
//! - **Percentiles**: linear-interpolation percentiles over `f64` samples
//! - **Descriptive statistics**: min, max, mean, median, variance, standard deviation
//!
//! # Modules
//!
//! - [`percentiles`]: Percentile computation and storage
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ## Computing percentiles
//!
//! ```
//! use citystats_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! assert_eq!(percentiles.get(25.0), Some(2.0));
//! ```
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use citystats_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod descriptive;
pub mod percentiles;
