//! CSV input for the CLI.
//!
//! The key column is parsed as the declared key type; every other column is
//! carried through as text. Empty cells are nulls.

use std::path::Path;

use sortmerge_core::prelude::{Column, DataType, RowBatch, Scalar};

pub fn load_csv(
    path: &Path,
    key: &str,
    key_type: DataType,
) -> Result<RowBatch, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let key_idx = headers
        .iter()
        .position(|h| h == key)
        .ok_or_else(|| format!("{}: no column named '{}'", path.display(), key))?;

    let mut columns: Vec<Column> = headers
        .iter()
        .map(|h| Column::new(h, Vec::new()))
        .collect();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        for (idx, cell) in record.iter().enumerate() {
            let value = if idx == key_idx {
                Scalar::parse_as(cell, key_type)
                    .map_err(|e| format!("{} row {}: {}", path.display(), line + 1, e))?
            } else if cell.is_empty() {
                Scalar::Null
            } else {
                Scalar::Str(cell.to_string())
            };
            columns[idx].values.push(value);
        }
    }

    tracing::debug!(
        path = %path.display(),
        rows = columns.first().map(|c| c.len()).unwrap_or(0),
        columns = columns.len(),
        "loaded csv"
    );
    Ok(RowBatch { columns })
}

/// JSON rendering of one cell. Non-finite floats become `null`.
pub fn scalar_json(value: &Scalar) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::from(*b),
        Scalar::I8(v) => Value::from(*v),
        Scalar::I16(v) => Value::from(*v),
        Scalar::I32(v) => Value::from(*v),
        Scalar::I64(v) => Value::from(*v),
        Scalar::U8(v) => Value::from(*v),
        Scalar::U16(v) => Value::from(*v),
        Scalar::U32(v) => Value::from(*v),
        Scalar::U64(v) => Value::from(*v),
        Scalar::F32(v) => Value::from(*v as f64),
        Scalar::F64(v) => Value::from(*v),
        Scalar::Str(s) => Value::from(s.as_str()),
        Scalar::Bin(b) => Value::from(b.clone()),
    }
}

/// Row `row` of `batch` as a JSON object keyed by column name.
pub fn row_json(batch: &RowBatch, row: usize) -> serde_json::Value {
    let mut obj = serde_json::Map::with_capacity(batch.columns.len());
    for col in &batch.columns {
        let v = col.values.get(row).map(scalar_json).unwrap_or_default();
        obj.insert(col.name.clone(), v);
    }
    serde_json::Value::Object(obj)
}
