//! Convenient re-exports for downstream crates.

pub use crate::config::{EngineConfig, STANDARD_VECTOR_SIZE};
pub use crate::error::{Error, Result};
pub use crate::join::JoinComparison;
pub use crate::manifest::{JoinManifest, ManifestId};
pub use crate::schema::{DataType, Field, Schema};
pub use crate::types::{Column, RowBatch, Scalar};
