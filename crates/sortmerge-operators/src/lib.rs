#![forbid(unsafe_code)]
//! sortmerge-operators: resumable sort-merge join kernels and the operator
//! surface built on them.
//!
//! Design intent:
//! - Pure and synchronous. A merge call never blocks and never allocates
//!   beyond the output buffers its cursors were created with.
//! - Inputs arrive already sorted; nothing here sorts or validates order.
//! - `join` holds the engine (cursors, kernels, dispatch, driver,
//!   partitions); `join::merge` wraps it as an `Operator` over `RowBatch`es.

pub mod join;
pub mod plan;
pub mod traits;

pub use join::{
    join_partitions, KeyColumn, KeyCursor, MergeCursor, MergeDriver, MergeError, MergeJoin,
    MergeKernel,
};
pub use plan::{Footprint, OpPlan};
pub use traits::{BlockStream, OpError, Operator};
