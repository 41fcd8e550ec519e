#![warn(missing_docs)]
//! Shared fixtures, a reference face oracle and JSON mesh metrics for tests
//! and CI runs.

pub mod fixtures;
mod metrics;
mod reference;

pub use metrics::*;
pub use reference::*;
