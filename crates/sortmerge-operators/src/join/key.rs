//! Join key types: the ordering capability each primitive supplies, and the
//! typed key columns cursors are built over.

use std::cmp::Ordering;

use sortmerge_core::schema::DataType;
use sortmerge_core::types::{Column, Scalar};

use super::cursor::{KeyCursor, MergeCursor};
use super::error::{MergeError, MergeResult};

/// Invoke `$m!` with every supported key type as
/// `(rust type, KeyData/DataType variant, Scalar variant)`.
macro_rules! for_each_key_type {
    ($m:ident) => {
        $m! {
            (i8, Int8, I8),
            (i16, Int16, I16),
            (i32, Int32, I32),
            (i64, Int64, I64),
            (u8, UInt8, U8),
            (u16, UInt16, U16),
            (u32, UInt32, U32),
            (u64, UInt64, U64),
            (f32, Float32, F32),
            (f64, Float64, F64)
        }
    };
}
pub(crate) use for_each_key_type;

/// A primitive the merge algorithms can key on.
///
/// `merge_cmp` must be a total order consistent with how the inputs were
/// sorted. Floats order NaN after every number and treat all NaNs as equal,
/// matching the sort order `sortmerge-core` uses for scalars.
pub trait MergeKey: Copy + Default + Send + Sync + std::fmt::Debug + 'static {
    const DATA_TYPE: DataType;

    fn merge_cmp(&self, other: &Self) -> Ordering;

    fn from_scalar(scalar: &Scalar) -> Option<Self>;

    fn into_data(values: Vec<Self>) -> KeyData;

    /// Borrow the typed cursor if `cursor` runs over this key type.
    fn cursor_mut<'c, 'a>(cursor: &'c mut KeyCursor<'a>) -> Option<&'c mut MergeCursor<'a, Self>>;
}

macro_rules! impl_key_common {
    ($t:ty, $variant:ident, $scalar:ident) => {
        const DATA_TYPE: DataType = DataType::$variant;

        #[inline]
        fn from_scalar(scalar: &Scalar) -> Option<Self> {
            match scalar {
                Scalar::$scalar(v) => Some(*v),
                _ => None,
            }
        }

        fn into_data(values: Vec<Self>) -> KeyData {
            KeyData::$variant(values)
        }

        fn cursor_mut<'c, 'a>(
            cursor: &'c mut KeyCursor<'a>,
        ) -> Option<&'c mut MergeCursor<'a, Self>> {
            match cursor {
                KeyCursor::$variant(c) => Some(c),
                _ => None,
            }
        }
    };
}

macro_rules! impl_int_key {
    ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
        $(
            impl MergeKey for $t {
                impl_key_common!($t, $variant, $scalar);

                #[inline]
                fn merge_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

macro_rules! impl_float_key {
    ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
        $(
            impl MergeKey for $t {
                impl_key_common!($t, $variant, $scalar);

                #[inline]
                fn merge_cmp(&self, other: &Self) -> Ordering {
                    match (self.is_nan(), other.is_nan()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Greater,
                        (false, true) => Ordering::Less,
                        (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    }
                }
            }
        )*
    };
}

impl_int_key!(
    (i8, Int8, I8),
    (i16, Int16, I16),
    (i32, Int32, I32),
    (i64, Int64, I64),
    (u8, UInt8, U8),
    (u16, UInt16, U16),
    (u32, UInt32, U32),
    (u64, UInt64, U64)
);
impl_float_key!((f32, Float32, F32), (f64, Float64, F64));

macro_rules! define_key_data {
    ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
        /// Physical key storage for one side of a join, one primitive type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum KeyData {
            $($variant(Vec<$t>),)*
        }

        impl KeyData {
            pub fn key_type(&self) -> DataType {
                match self {
                    $(KeyData::$variant(_) => DataType::$variant,)*
                }
            }

            /// Number of physical values.
            pub fn len(&self) -> usize {
                match self {
                    $(KeyData::$variant(v) => v.len(),)*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        $(
            impl From<Vec<$t>> for KeyData {
                fn from(v: Vec<$t>) -> Self {
                    KeyData::$variant(v)
                }
            }
        )*
    };
}
for_each_key_type!(define_key_data);

/// True if the merge engine has a kernel for `data_type`.
pub fn is_supported_key_type(data_type: DataType) -> bool {
    macro_rules! supported {
        ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
            matches!(data_type, $(DataType::$variant)|*)
        };
    }
    for_each_key_type!(supported)
}

/// Typed key values plus the selection vector mapping logical (sorted)
/// positions to physical offsets in `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyColumn {
    data: KeyData,
    selection: Vec<usize>,
}

impl KeyColumn {
    /// Key column with the identity selection.
    pub fn new(data: impl Into<KeyData>) -> Self {
        let data = data.into();
        let selection = (0..data.len()).collect();
        Self { data, selection }
    }

    /// Key column read through `selection`. Every entry must be a valid
    /// physical offset into `data`.
    pub fn with_selection(data: impl Into<KeyData>, selection: Vec<usize>) -> MergeResult<Self> {
        let data = data.into();
        if let Some(&bad) = selection.iter().find(|&&s| s >= data.len()) {
            return Err(MergeError::Invariant(format!(
                "selection entry {} out of bounds for {} key values",
                bad,
                data.len()
            )));
        }
        Ok(Self { data, selection })
    }

    /// Build a key column from a row batch column declared as `key_type`.
    ///
    /// Physical offsets equal row indices. Null rows keep a placeholder value
    /// in `data` and are left out of the selection when `exclude_nulls` is
    /// set; otherwise a null key is an error.
    pub fn from_column(column: &Column, key_type: DataType, exclude_nulls: bool) -> MergeResult<Self> {
        fn collect<T: MergeKey>(column: &Column, exclude_nulls: bool) -> MergeResult<KeyColumn> {
            let mut values = Vec::with_capacity(column.len());
            let mut selection = Vec::with_capacity(column.len());
            for (row, scalar) in column.values.iter().enumerate() {
                if scalar.is_null() {
                    if !exclude_nulls {
                        return Err(MergeError::NullKey(row));
                    }
                    values.push(T::default());
                    continue;
                }
                let v = T::from_scalar(scalar).ok_or_else(|| MergeError::KeyTypeMismatch {
                    expected: T::DATA_TYPE,
                    // Non-null scalars always carry a type.
                    found: scalar.data_type().unwrap_or(T::DATA_TYPE),
                })?;
                values.push(v);
                selection.push(row);
            }
            Ok(KeyColumn {
                data: T::into_data(values),
                selection,
            })
        }

        macro_rules! from_column {
            ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
                match key_type {
                    $(DataType::$variant => collect::<$t>(column, exclude_nulls),)*
                    other => Err(MergeError::UnsupportedKeyType(other)),
                }
            };
        }
        for_each_key_type!(from_column)
    }

    /// Type of the first non-null value, if any.
    pub fn infer_key_type(column: &Column) -> Option<DataType> {
        column.values.iter().find_map(|s| s.data_type())
    }

    pub fn key_type(&self) -> DataType {
        self.data.key_type()
    }

    pub fn data(&self) -> &KeyData {
        &self.data
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Logical length (selected rows).
    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Fresh cursor over every selected row with an output buffer of
    /// `capacity` offsets.
    pub fn cursor(&self, capacity: usize) -> MergeResult<KeyCursor<'_>> {
        KeyCursor::new(self, self.len(), capacity)
    }
}
