//! Resolve a `(key type, comparison)` pair into a concrete merge kernel.
//!
//! Resolution happens once per join setup. The resulting [`MergeKernel`] is
//! a plain function pointer plus an operand-order flag, so the per-call cost
//! is one indirect call and one enum match on each cursor.

use serde::{Deserialize, Serialize};
use sortmerge_core::join::JoinComparison;
use sortmerge_core::schema::DataType;

use super::cursor::KeyCursor;
use super::error::{MergeError, MergeResult};
use super::inner::{self, MergeOp};
use super::key::{for_each_key_type, MergeKey};

/// Which of the three kernels runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeAlgorithm {
    Equality,
    LessThan,
    LessThanEquals,
}

impl MergeAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            MergeAlgorithm::Equality => inner::Equality::NAME,
            MergeAlgorithm::LessThan => inner::LessThan::NAME,
            MergeAlgorithm::LessThanEquals => inner::LessThanEquals::NAME,
        }
    }

    /// Kernel and operand order implementing `comparison`.
    ///
    /// `>` and `>=` are `<` and `<=` with the operands exchanged.
    pub fn for_comparison(comparison: JoinComparison) -> MergeResult<(MergeAlgorithm, bool)> {
        Ok(match comparison {
            JoinComparison::Equal => (MergeAlgorithm::Equality, false),
            JoinComparison::LessThan => (MergeAlgorithm::LessThan, false),
            JoinComparison::LessThanOrEqual => (MergeAlgorithm::LessThanEquals, false),
            JoinComparison::GreaterThan => (MergeAlgorithm::LessThan, true),
            JoinComparison::GreaterThanOrEqual => (MergeAlgorithm::LessThanEquals, true),
            JoinComparison::NotEqual => return Err(MergeError::UnsupportedComparison(comparison)),
        })
    }
}

type KernelFn = fn(&mut KeyCursor<'_>, &mut KeyCursor<'_>) -> MergeResult<usize>;

fn typed_kernel<T: MergeKey, O: MergeOp>(
    left: &mut KeyCursor<'_>,
    right: &mut KeyCursor<'_>,
) -> MergeResult<usize> {
    let found = if left.key_type() != T::DATA_TYPE {
        left.key_type()
    } else {
        right.key_type()
    };
    match (left.typed_mut::<T>(), right.typed_mut::<T>()) {
        (Some(l), Some(r)) => Ok(O::merge(l, r)),
        _ => Err(MergeError::KeyTypeMismatch {
            expected: T::DATA_TYPE,
            found,
        }),
    }
}

fn kernel_for<T: MergeKey>(algorithm: MergeAlgorithm) -> KernelFn {
    match algorithm {
        MergeAlgorithm::Equality => typed_kernel::<T, inner::Equality>,
        MergeAlgorithm::LessThan => typed_kernel::<T, inner::LessThan>,
        MergeAlgorithm::LessThanEquals => typed_kernel::<T, inner::LessThanEquals>,
    }
}

/// A resolved merge kernel for one join.
#[derive(Clone, Copy)]
pub struct MergeKernel {
    key_type: DataType,
    comparison: JoinComparison,
    algorithm: MergeAlgorithm,
    swapped: bool,
    func: KernelFn,
}

impl std::fmt::Debug for MergeKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeKernel")
            .field("key_type", &self.key_type)
            .field("comparison", &self.comparison)
            .field("algorithm", &self.algorithm)
            .field("swapped", &self.swapped)
            .finish()
    }
}

impl MergeKernel {
    pub fn resolve(key_type: DataType, comparison: JoinComparison) -> MergeResult<Self> {
        let (algorithm, swapped) = MergeAlgorithm::for_comparison(comparison)?;

        macro_rules! table {
            ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
                match key_type {
                    $(DataType::$variant => kernel_for::<$t>(algorithm),)*
                    other => return Err(MergeError::UnsupportedKeyType(other)),
                }
            };
        }
        let func = for_each_key_type!(table);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            key_type = %key_type,
            comparison = %comparison,
            algorithm = algorithm.name(),
            swapped,
            "resolved merge kernel"
        );

        Ok(Self {
            key_type,
            comparison,
            algorithm,
            swapped,
            func,
        })
    }

    /// Run one bounded merge call and return the number of pairs written.
    ///
    /// Cursors keep their roles from the caller's point of view: `left`
    /// always collects left-side offsets. For swapped kernels the cursors
    /// are handed to the algorithm in reverse order; since each cursor writes
    /// its own offsets into its own buffer, no un-swapping of results is
    /// needed afterwards.
    pub fn merge(&self, left: &mut KeyCursor<'_>, right: &mut KeyCursor<'_>) -> MergeResult<usize> {
        if self.swapped {
            (self.func)(right, left)
        } else {
            (self.func)(left, right)
        }
    }

    pub fn key_type(&self) -> DataType {
        self.key_type
    }

    pub fn comparison(&self) -> JoinComparison {
        self.comparison
    }

    pub fn algorithm(&self) -> MergeAlgorithm {
        self.algorithm
    }

    pub fn swapped(&self) -> bool {
        self.swapped
    }

    /// True once a short call means the pairing is drained: the side that
    /// terminates the algorithm's loop is exhausted.
    pub(crate) fn is_drained(&self, left: &KeyCursor<'_>, right: &KeyCursor<'_>) -> bool {
        left.is_exhausted() || right.is_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::key::KeyColumn;

    #[test]
    fn greater_than_runs_less_than_swapped() {
        let k = MergeKernel::resolve(DataType::Int64, JoinComparison::GreaterThan).unwrap();
        assert_eq!(k.algorithm(), MergeAlgorithm::LessThan);
        assert!(k.swapped());

        let k = MergeKernel::resolve(DataType::Float32, JoinComparison::GreaterThanOrEqual).unwrap();
        assert_eq!(k.algorithm(), MergeAlgorithm::LessThanEquals);
        assert!(k.swapped());
    }

    #[test]
    fn not_equal_is_rejected() {
        let err = MergeKernel::resolve(DataType::Int32, JoinComparison::NotEqual).unwrap_err();
        assert!(matches!(err, MergeError::UnsupportedComparison(JoinComparison::NotEqual)));
    }

    #[test]
    fn non_numeric_keys_are_rejected() {
        for dt in [DataType::Utf8, DataType::Binary, DataType::Boolean] {
            assert!(matches!(
                MergeKernel::resolve(dt, JoinComparison::Equal),
                Err(MergeError::UnsupportedKeyType(_))
            ));
        }
    }

    #[test]
    fn swapped_kernel_keeps_result_columns_per_side() {
        // left > right
        let left = KeyColumn::new(vec![1i32, 5]);
        let right = KeyColumn::new(vec![2i32, 3, 9]);
        let k = MergeKernel::resolve(DataType::Int32, JoinComparison::GreaterThan).unwrap();
        let mut lc = left.cursor(16).unwrap();
        let mut rc = right.cursor(16).unwrap();
        let n = k.merge(&mut lc, &mut rc).unwrap();
        let mut pairs: Vec<_> = lc.matches()[..n]
            .iter()
            .copied()
            .zip(rc.matches()[..n].iter().copied())
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn mismatched_cursor_types_are_contract_violations() {
        let left = KeyColumn::new(vec![1i32]);
        let right = KeyColumn::new(vec![1i64]);
        let k = MergeKernel::resolve(DataType::Int32, JoinComparison::Equal).unwrap();
        let mut lc = left.cursor(4).unwrap();
        let mut rc = right.cursor(4).unwrap();
        let err = k.merge(&mut lc, &mut rc).unwrap_err();
        assert!(matches!(
            err,
            MergeError::KeyTypeMismatch {
                expected: DataType::Int32,
                found: DataType::Int64
            }
        ));
    }
}
