#![forbid(unsafe_code)]
//! sortmerge: resumable sort-merge joins over pre-sorted key columns.
//!
//! Facade over the workspace crates. Most callers want [`MergeJoin`] for
//! row batches, or [`MergeDriver`] with two [`KeyColumn`]s for raw offset
//! pairs.

pub use sortmerge_core;
pub use sortmerge_operators;

pub use sortmerge_core::prelude::*;
pub use sortmerge_operators::{
    join_partitions, KeyColumn, KeyCursor, MergeCursor, MergeDriver, MergeError, MergeJoin,
    MergeKernel, OpError, Operator,
};
