//! Operator trait + common interfaces.
//!
//! The caller invokes `plan(...)` once to validate input schemas and obtain
//! an `OpPlan`, then `eval_block(...)` per aligned set of input blocks.

use sortmerge_core::prelude::Schema;
use sortmerge_core::types::RowBatch;

use crate::join::MergeError;
use crate::plan::{Footprint, OpPlan};

use thiserror::Error;

/// Output of operators that emit one block per bounded step.
pub type BlockStream = Vec<RowBatch>;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("planning error: {0}")]
    Plan(String),

    #[error("execution error: {0}")]
    Exec(String),

    #[error("schema error: {0}")]
    Schema(String),
}

impl From<MergeError> for OpError {
    fn from(e: MergeError) -> Self {
        match e {
            MergeError::UnsupportedComparison(_) | MergeError::UnsupportedKeyType(_) => {
                OpError::Plan(e.to_string())
            }
            MergeError::KeyTypeMismatch { .. } => OpError::Schema(e.to_string()),
            MergeError::Core(core) => core.into(),
            MergeError::NullKey(_) | MergeError::Invariant(_) => OpError::Exec(e.to_string()),
        }
    }
}

impl From<sortmerge_core::error::Error> for OpError {
    fn from(e: sortmerge_core::error::Error) -> Self {
        use sortmerge_core::error::Error;
        match e {
            Error::Schema(_) => OpError::Schema(e.to_string()),
            Error::Plan(_) | Error::Config(_) => OpError::Plan(e.to_string()),
            Error::Hash(_) | Error::Invariant(_) => OpError::Exec(e.to_string()),
        }
    }
}

/// Trait that all operators must implement.
///
/// Invariants:
/// - `eval_block` must be deterministic given the same inputs.
/// - Preconditions on input order are stated by `OpPlan::required_ordering`
///   and are not re-checked per block.
pub trait Operator: Send + Sync + 'static {
    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    /// Rough memory footprint model for a block of `rows`/`bytes`.
    fn memory_need(&self, rows: u64, bytes: u64) -> Footprint;

    /// Given input schemas, return a concrete plan with output schema and
    /// ordering requirements.
    fn plan(&self, input_schemas: &[Schema]) -> Result<OpPlan, OpError>;

    /// Evaluate one block worth of data.
    ///
    /// For unary ops, pass `inputs[0]`. For binary ops (joins), pass the left
    /// and right blocks in that order.
    fn eval_block(&self, inputs: &[RowBatch]) -> Result<RowBatch, OpError>;
}
