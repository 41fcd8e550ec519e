#![warn(missing_docs)]
//! Voxel storage consumed by the mesher: chunks, multi-chunk storage and the
//! read-only query adapter used for cross-chunk lookups.

mod chunk;
mod query;
mod storage;

pub use chunk::*;
pub use query::*;
pub use storage::*;
