//! Aggregation Engine: pure functions from a [`Snapshot`](crate::context::Snapshot)
//! to a derived view.
//!
//! No function mutates its input and the order of invocation does not
//! matter. Records lacking an optional field (country, timestamps) are left
//! out of the views that need it, and session guesses that reference an
//! unknown city are skipped.

mod cities;
mod countries;
mod sessions;

pub use self::{cities::*, countries::*, sessions::*};
