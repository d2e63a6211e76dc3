use sortmerge_core::join::JoinComparison;
use sortmerge_core::schema::DataType;
use thiserror::Error;

/// Errors raised while setting up or driving a merge.
///
/// `UnsupportedComparison` and `UnsupportedKeyType` are planning errors the
/// caller should have caught before execution. The rest are internal
/// consistency faults: they point at a bug in whoever drives the merge, not
/// at bad input data.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("merge join cannot evaluate comparison '{0}'")]
    UnsupportedComparison(JoinComparison),

    #[error("unsupported merge join key type: {0}")]
    UnsupportedKeyType(DataType),

    #[error("join key type mismatch: expected {expected}, found {found}")]
    KeyTypeMismatch { expected: DataType, found: DataType },

    #[error("null join key at row {0} with null exclusion disabled")]
    NullKey(usize),

    #[error("merge contract violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Core(#[from] sortmerge_core::error::Error),
}

pub type MergeResult<T> = std::result::Result<T, MergeError>;
