//! Merge join operator over row batches.
//!
//! Precondition: both inputs arrive sorted ascending on their join key
//! (nulls first, the way an upstream sort emits them). Sortedness is not
//! re-checked here; unsorted input yields wrong pairs, not an error.

use sortmerge_core::config::EngineConfig;
use sortmerge_core::join::JoinComparison;
use sortmerge_core::prelude::Schema;
use sortmerge_core::schema::DataType;
use sortmerge_core::types::RowBatch;

use super::dispatch::MergeKernel;
use super::driver::MergeDriver;
use super::key::KeyColumn;
use crate::plan::{Footprint, OpPlan};
use crate::traits::{BlockStream, OpError, Operator};

#[derive(Debug, Clone)]
pub struct MergeJoin {
    pub left_on: String,
    pub right_on: String,
    pub comparison: JoinComparison,
    pub config: EngineConfig,
}

impl MergeJoin {
    pub fn new(
        left_on: impl Into<String>,
        right_on: impl Into<String>,
        comparison: JoinComparison,
    ) -> Self {
        Self {
            left_on: left_on.into(),
            right_on: right_on.into(),
            comparison,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Streaming: one typed key plus one selection entry per input row, and
    /// one offset buffer of `vector_size` per side. Unknown key widths count
    /// as a full word.
    fn footprint(&self, key_width: Option<usize>) -> Footprint {
        let word = std::mem::size_of::<usize>() as u64;
        let key = key_width.map(|w| w as u64).unwrap_or(word);
        Footprint {
            bytes_per_row: key + word,
            overhead_bytes: 2 * self.config.vector_size as u64 * word,
        }
    }

    /// Typed key columns for both sides, or `None` when either side has no
    /// non-null key and so cannot match anything.
    fn key_columns(
        &self,
        left: &RowBatch,
        right: &RowBatch,
    ) -> Result<Option<(KeyColumn, KeyColumn)>, OpError> {
        let lcol = left.column(&self.left_on).ok_or_else(|| {
            OpError::Schema(format!("left join key '{}' not found", self.left_on))
        })?;
        let rcol = right.column(&self.right_on).ok_or_else(|| {
            OpError::Schema(format!("right join key '{}' not found", self.right_on))
        })?;

        let (Some(lt), Some(rt)) = (
            KeyColumn::infer_key_type(lcol),
            KeyColumn::infer_key_type(rcol),
        ) else {
            return Ok(None);
        };
        if lt != rt {
            return Err(OpError::Schema(format!(
                "join keys '{}' ({}) and '{}' ({}) differ in type",
                self.left_on, lt, self.right_on, rt
            )));
        }

        let lkeys = KeyColumn::from_column(lcol, lt, self.config.exclude_nulls)?;
        let rkeys = KeyColumn::from_column(rcol, rt, self.config.exclude_nulls)?;
        Ok(Some((lkeys, rkeys)))
    }

    /// Join two sorted blocks, one output block per merge call (each at most
    /// `config.vector_size` rows).
    pub fn eval_batches(&self, left: &RowBatch, right: &RowBatch) -> Result<BlockStream, OpError> {
        self.config.validate()?;
        let Some((lkeys, rkeys)) = self.key_columns(left, right)? else {
            // still reject comparisons the merge cannot run
            MergeKernel::resolve(DataType::Int64, self.comparison)?;
            return Ok(Vec::new());
        };

        let mut driver =
            MergeDriver::for_columns(&lkeys, &rkeys, self.comparison, self.config.vector_size)?;
        let mut out = Vec::new();
        while let Some(batch) = driver.next_batch()? {
            let l = left.take(batch.left)?;
            let r = right.take(batch.right)?;
            out.push(RowBatch::concat(&l, &r)?);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            op = self.name(),
            left_rows = left.num_rows(),
            right_rows = right.num_rows(),
            matches = driver.stats().matches,
            blocks = out.len(),
            "merge join block evaluated"
        );

        Ok(out)
    }
}

impl Operator for MergeJoin {
    fn name(&self) -> &'static str {
        "join_merge"
    }

    fn memory_need(&self, _rows: u64, _bytes: u64) -> Footprint {
        self.footprint(None)
    }

    fn plan(&self, input_schemas: &[Schema]) -> Result<OpPlan, OpError> {
        let [left, right] = input_schemas else {
            return Err(OpError::Plan("merge join expects two inputs".into()));
        };
        let lf = left.field_by_name(&self.left_on).ok_or_else(|| {
            OpError::Schema(format!("left join key '{}' not found", self.left_on))
        })?;
        let rf = right.field_by_name(&self.right_on).ok_or_else(|| {
            OpError::Schema(format!("right join key '{}' not found", self.right_on))
        })?;
        if lf.data_type != rf.data_type {
            return Err(OpError::Schema(format!(
                "join keys '{}' ({}) and '{}' ({}) differ in type",
                lf.name, lf.data_type, rf.name, rf.data_type
            )));
        }
        MergeKernel::resolve(lf.data_type, self.comparison)?;

        let out = Schema::join(left, right);
        Ok(OpPlan::new(out, self.footprint(lf.data_type.byte_width()))
            .with_ordering(vec![self.left_on.clone(), self.right_on.clone()]))
    }

    fn eval_block(&self, inputs: &[RowBatch]) -> Result<RowBatch, OpError> {
        let [left, right] = inputs else {
            return Err(OpError::Exec("merge join needs two block inputs".into()));
        };
        // Empty result still carries the joined column layout.
        let mut out = RowBatch::concat(&left.take(&[])?, &right.take(&[])?)?;
        for block in self.eval_batches(left, right)? {
            out.append(block)?;
        }
        Ok(out)
    }
}
