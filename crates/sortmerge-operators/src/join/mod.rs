//! Sort-merge join over pre-sorted, selection-vector-indexed key columns.
//!
//! Layering, bottom up:
//! - `key`: the `MergeKey` ordering per primitive and typed `KeyColumn`s.
//! - `cursor`: per-side resumable state (`MergeCursor`, `KeyCursor`).
//! - `inner`: the equality / less-than / less-than-or-equal kernels.
//! - `dispatch`: `(key type, comparison)` → `MergeKernel`, with `>`/`>=`
//!   as swapped `<`/`<=`.
//! - `driver`: repeated bounded calls until a pairing is drained.
//! - `partition`: independent pairings across worker threads.
//! - `merge`: the `MergeJoin` operator over row batches.
//!
//! Multi-column keys are not handled here; they reduce to repeated
//! application over one key column at a time.

pub mod cursor;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod inner;
pub mod key;
pub mod merge;
pub mod partition;

pub use cursor::{KeyCursor, MergeCursor};
pub use dispatch::{MergeAlgorithm, MergeKernel};
pub use driver::{DriverStats, MatchBatch, MergeDriver};
pub use error::{MergeError, MergeResult};
pub use inner::{equality, less_than, less_than_equals};
pub use key::{is_supported_key_type, KeyColumn, KeyData, MergeKey};
pub use merge::MergeJoin;
pub use partition::{join_partitions, PartitionMatches};
