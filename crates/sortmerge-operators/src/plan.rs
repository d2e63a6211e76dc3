//! Operator planning surfaces: `Footprint` and `OpPlan`.

use sortmerge_core::prelude::Schema;
use serde::{Deserialize, Serialize};

/// Coarse memory model for a block flowing through an operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    /// Estimated bytes per input row held while the block is processed.
    pub bytes_per_row: u64,
    /// Fixed per-block overhead (output buffers, cursor state).
    pub overhead_bytes: u64,
}

impl Footprint {
    /// Estimate total live bytes for a block of `rows`/`bytes` at this operator.
    pub fn estimate_live(&self, rows: u64, _bytes: u64) -> u64 {
        self.overhead_bytes + self.bytes_per_row.saturating_mul(rows)
    }
}

/// Operator plan: output schema, input ordering requirements, and a cached footprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpPlan {
    pub output_schema: Schema,

    /// Column each input must arrive sorted on, one entry per input, in input order.
    pub required_ordering: Vec<String>,

    /// Footprint model cached to avoid recomputation.
    pub footprint: Footprint,
}

impl OpPlan {
    pub fn new(output_schema: Schema, footprint: Footprint) -> Self {
        Self {
            output_schema,
            required_ordering: vec![],
            footprint,
        }
    }

    pub fn with_ordering(mut self, cols: Vec<String>) -> Self {
        self.required_ordering = cols;
        self
    }
}
