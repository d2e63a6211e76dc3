//! Logical schema types. Pure data; no Arrow dependency here.
//!
//! The `types.rs` module contains the lightweight `Scalar`/`Column` values that
//! flow through operators. Join keys are narrowed to fixed-width primitives
//! before they reach the merge engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Utf8,
    Binary,
}

impl DataType {
    /// Byte width of one value, `None` for variable-width types.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            DataType::Boolean | DataType::Int8 | DataType::UInt8 => Some(1),
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => Some(4),
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => Some(8),
            DataType::Utf8 | DataType::Binary => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataType::Boolean => "bool",
            DataType::Int8 => "i8",
            DataType::Int16 => "i16",
            DataType::Int32 => "i32",
            DataType::Int64 => "i64",
            DataType::UInt8 => "u8",
            DataType::UInt16 => "u16",
            DataType::UInt32 => "u32",
            DataType::UInt64 => "u64",
            DataType::Float32 => "f32",
            DataType::Float64 => "f64",
            DataType::Utf8 => "utf8",
            DataType::Binary => "binary",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for DataType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => DataType::Boolean,
            "i8" | "int8" | "tinyint" => DataType::Int8,
            "i16" | "int16" | "smallint" => DataType::Int16,
            "i32" | "int32" | "int" | "integer" => DataType::Int32,
            "i64" | "int64" | "bigint" => DataType::Int64,
            "u8" | "uint8" => DataType::UInt8,
            "u16" | "uint16" => DataType::UInt16,
            "u32" | "uint32" => DataType::UInt32,
            "u64" | "uint64" => DataType::UInt64,
            "f32" | "float32" | "float" | "real" => DataType::Float32,
            "f64" | "float64" | "double" => DataType::Float64,
            "utf8" | "string" | "varchar" => DataType::Utf8,
            "binary" | "blob" => DataType::Binary,
            other => {
                return Err(crate::error::Error::Schema(format!(
                    "unknown data type '{}'",
                    other
                )))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.index_of(name).and_then(|i| self.field(i))
    }

    /// Join output schema: left fields, then right fields. Right names that
    /// collide with a left name get a `_right` suffix, same as
    /// `RowBatch::concat`.
    pub fn join(left: &Schema, right: &Schema) -> Schema {
        let mut fields = left.fields.clone();
        for f in &right.fields {
            let mut f = f.clone();
            if left.index_of(&f.name).is_some() {
                f.name = format!("{}_right", f.name);
            }
            fields.push(f);
        }
        Schema { fields }
    }
}
