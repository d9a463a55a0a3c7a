//! Batch analysis of a city-guessing quiz.
//!
//! This crate turns a snapshot of quiz sessions and the city reference table
//! into derived statistical views, memoizing every view in a flat JSON cache
//! so that repeated runs skip recomputation.
//!
//! # Overview
//!
//! 1. **Load records** ([`store::RecordStore`]): read sessions and cities,
//!    optionally dropping sessions with fewer than ten guesses
//! 2. **Build the context** ([`context::AnalysisContext`]): borrow the
//!    [`context::Snapshot`] and a [`cache::ViewCache`] for the run
//! 3. **Compute views** ([`aggregate`]): percentiles, nationalities,
//!    per-letter rankings, popularity ratios and "forgotten" entities, each
//!    fetched through the cache
//! 4. **Persist** the cache for the next run
//!
//! Expected guess counts come from a piecewise log-linear population model
//! ([`expected`]).
//!
//! # Example
//!
//! ```no_run
//! use citystats_analysis::{
//!     cache::ViewCache,
//!     context::{AnalysisContext, ForcePolicy, Snapshot},
//!     store::{DataPaths, RecordStore},
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let paths = DataPaths::in_dir("data");
//! let snapshot = Snapshot::load(&RecordStore::new(paths.clone()), true)?;
//! let mut cache = ViewCache::load(&paths.cache);
//!
//! let mut context = AnalysisContext::new(&snapshot, &mut cache, ForcePolicy::Never);
//! let percentiles = context.percentiles()?;
//! println!("Median score: {:?}", percentiles.get(50));
//!
//! cache.save(&paths.cache)?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cache;
pub mod context;
pub mod error;
pub mod expected;
pub mod record;
pub mod store;
pub mod tally;

#[cfg(test)]
mod test_support;

pub use self::error::AnalysisError;
