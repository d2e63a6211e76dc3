//! Lightweight logical value/column placeholders to avoid bringing Arrow into core.
//!
//! Operators narrow these to typed primitive buffers (see the join key
//! columns in `sortmerge-operators`) before running hot loops over them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
}

impl Scalar {
    /// Logical type of this value; `None` for `Null`, which is untyped.
    pub fn data_type(&self) -> Option<DataType> {
        Some(match self {
            Scalar::Null => return None,
            Scalar::Bool(_) => DataType::Boolean,
            Scalar::I8(_) => DataType::Int8,
            Scalar::I16(_) => DataType::Int16,
            Scalar::I32(_) => DataType::Int32,
            Scalar::I64(_) => DataType::Int64,
            Scalar::U8(_) => DataType::UInt8,
            Scalar::U16(_) => DataType::UInt16,
            Scalar::U32(_) => DataType::UInt32,
            Scalar::U64(_) => DataType::UInt64,
            Scalar::F32(_) => DataType::Float32,
            Scalar::F64(_) => DataType::Float64,
            Scalar::Str(_) => DataType::Utf8,
            Scalar::Bin(_) => DataType::Binary,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Parse a text cell as `data_type`. Empty cells become `Null`.
    pub fn parse_as(text: &str, data_type: DataType) -> Result<Scalar> {
        let t = text.trim();
        if t.is_empty() {
            return Ok(Scalar::Null);
        }
        let bad = |_| Error::Schema(format!("cannot parse '{}' as {}", t, data_type));
        Ok(match data_type {
            DataType::Boolean => Scalar::Bool(t.parse().map_err(|_| {
                Error::Schema(format!("cannot parse '{}' as {}", t, data_type))
            })?),
            DataType::Int8 => Scalar::I8(t.parse().map_err(bad)?),
            DataType::Int16 => Scalar::I16(t.parse().map_err(bad)?),
            DataType::Int32 => Scalar::I32(t.parse().map_err(bad)?),
            DataType::Int64 => Scalar::I64(t.parse().map_err(bad)?),
            DataType::UInt8 => Scalar::U8(t.parse().map_err(bad)?),
            DataType::UInt16 => Scalar::U16(t.parse().map_err(bad)?),
            DataType::UInt32 => Scalar::U32(t.parse().map_err(bad)?),
            DataType::UInt64 => Scalar::U64(t.parse().map_err(bad)?),
            DataType::Float32 => Scalar::F32(t.parse().map_err(|_| {
                Error::Schema(format!("cannot parse '{}' as {}", t, data_type))
            })?),
            DataType::Float64 => Scalar::F64(t.parse().map_err(|_| {
                Error::Schema(format!("cannot parse '{}' as {}", t, data_type))
            })?),
            DataType::Utf8 => Scalar::Str(t.to_string()),
            DataType::Binary => Scalar::Bin(t.as_bytes().to_vec()),
        })
    }
}

/// Minimal column representation. Replace with Arrow arrays downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Scalar>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Scalar>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Minimal row batch. All columns have the same length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowBatch {
    pub columns: Vec<Column>,
}

impl RowBatch {
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Gather rows by physical offset, in the order given.
    ///
    /// Offsets may repeat (a many-to-many join emits the same row several
    /// times). An offset past the end of the batch is an error.
    pub fn take(&self, offsets: &[usize]) -> Result<RowBatch> {
        let rows = self.num_rows();
        if let Some(&bad) = offsets.iter().find(|&&o| o >= rows) {
            return Err(Error::Invariant(format!(
                "row offset {} out of bounds for batch of {} rows",
                bad, rows
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                values: offsets.iter().map(|&o| col.values[o].clone()).collect(),
            })
            .collect();
        Ok(RowBatch { columns })
    }

    /// Concatenate two RowBatches side-by-side (for join results).
    ///
    /// Both batches must have the same row count. Left columns come first;
    /// right columns whose name already exists on the left get a `_right`
    /// suffix.
    pub fn concat(left: &RowBatch, right: &RowBatch) -> Result<RowBatch> {
        if left.num_rows() != right.num_rows() {
            return Err(Error::Invariant(format!(
                "cannot concat batches with different row counts: {} vs {}",
                left.num_rows(),
                right.num_rows()
            )));
        }

        let mut columns = Vec::with_capacity(left.columns.len() + right.columns.len());
        columns.extend(left.columns.iter().cloned());
        for col in &right.columns {
            let mut new_col = col.clone();
            if left.columns.iter().any(|c| c.name == col.name) {
                new_col.name = format!("{}_right", col.name);
            }
            columns.push(new_col);
        }

        Ok(RowBatch { columns })
    }

    /// Append the rows of `other` (same column layout) to this batch.
    pub fn append(&mut self, other: RowBatch) -> Result<()> {
        if self.columns.is_empty() {
            *self = other;
            return Ok(());
        }
        if other.columns.len() != self.columns.len() {
            return Err(Error::Schema(format!(
                "cannot append batch with {} columns to batch with {}",
                other.columns.len(),
                self.columns.len()
            )));
        }
        for (dst, src) in self.columns.iter_mut().zip(other.columns) {
            dst.values.extend(src.values);
        }
        Ok(())
    }
}
