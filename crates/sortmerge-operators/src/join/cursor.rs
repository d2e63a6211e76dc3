//! Per-side merge state.
//!
//! A cursor never owns the key data: it borrows one side's values and
//! selection vector and keeps only the resumable logical position and the
//! output buffer of matched physical offsets. The caller owns the cursor and
//! passes it by `&mut` into the stateless merge functions.

use sortmerge_core::schema::DataType;

use super::error::{MergeError, MergeResult};
use super::key::{for_each_key_type, KeyColumn, KeyData, MergeKey};

#[derive(Debug)]
pub struct MergeCursor<'a, T> {
    pub(super) data: &'a [T],
    pub(super) selection: &'a [usize],
    pub(super) count: usize,
    /// Logical progress, `0 <= position <= count`.
    pub(super) position: usize,
    pub(super) matches: Vec<usize>,
}

fn check_contract(
    data_len: usize,
    selection: &[usize],
    count: usize,
    capacity: usize,
) -> MergeResult<()> {
    if capacity == 0 {
        return Err(MergeError::Invariant(
            "output capacity must be at least 1".into(),
        ));
    }
    if count > selection.len() {
        return Err(MergeError::Invariant(format!(
            "count {} exceeds selection length {}",
            count,
            selection.len()
        )));
    }
    if let Some(&bad) = selection[..count].iter().find(|&&s| s >= data_len) {
        return Err(MergeError::Invariant(format!(
            "selection entry {} out of bounds for {} values",
            bad, data_len
        )));
    }
    Ok(())
}

impl<'a, T: MergeKey> MergeCursor<'a, T> {
    /// Cursor over the first `count` logical positions of `selection`, with
    /// room for `capacity` matches per call.
    pub fn new(
        data: &'a [T],
        selection: &'a [usize],
        count: usize,
        capacity: usize,
    ) -> MergeResult<Self> {
        check_contract(data.len(), selection, count, capacity)?;
        Ok(Self {
            data,
            selection,
            count,
            position: 0,
            matches: vec![0; capacity],
        })
    }

    /// Point this cursor at the next batch. Position restarts at 0; the
    /// output buffer is reused.
    pub fn reset(&mut self, data: &'a [T], selection: &'a [usize], count: usize) -> MergeResult<()> {
        check_contract(data.len(), selection, count, self.matches.len())?;
        self.data = data;
        self.selection = selection;
        self.count = count;
        self.position = 0;
        Ok(())
    }

    /// Restart from the first logical position of the current batch.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    #[inline]
    pub(super) fn key(&self, logical: usize) -> T {
        self.data[self.selection[logical]]
    }

    #[inline]
    pub(super) fn offset(&self, logical: usize) -> usize {
        self.selection[logical]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.matches.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.count
    }

    /// The whole output buffer; only the prefix reported by the last merge
    /// call is meaningful.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }
}

/// A `MergeCursor` over whichever key type a join resolved to.
#[derive(Debug)]
pub enum KeyCursor<'a> {
    Int8(MergeCursor<'a, i8>),
    Int16(MergeCursor<'a, i16>),
    Int32(MergeCursor<'a, i32>),
    Int64(MergeCursor<'a, i64>),
    UInt8(MergeCursor<'a, u8>),
    UInt16(MergeCursor<'a, u16>),
    UInt32(MergeCursor<'a, u32>),
    UInt64(MergeCursor<'a, u64>),
    Float32(MergeCursor<'a, f32>),
    Float64(MergeCursor<'a, f64>),
}

macro_rules! with_cursor {
    ($cursor:expr, $c:ident => $e:expr) => {
        match $cursor {
            KeyCursor::Int8($c) => $e,
            KeyCursor::Int16($c) => $e,
            KeyCursor::Int32($c) => $e,
            KeyCursor::Int64($c) => $e,
            KeyCursor::UInt8($c) => $e,
            KeyCursor::UInt16($c) => $e,
            KeyCursor::UInt32($c) => $e,
            KeyCursor::UInt64($c) => $e,
            KeyCursor::Float32($c) => $e,
            KeyCursor::Float64($c) => $e,
        }
    };
}

impl<'a> KeyCursor<'a> {
    /// Cursor over the first `count` selected rows of `column`.
    pub fn new(column: &'a KeyColumn, count: usize, capacity: usize) -> MergeResult<Self> {
        macro_rules! build {
            ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
                match column.data() {
                    $(KeyData::$variant(values) => KeyCursor::$variant(MergeCursor::new(
                        values,
                        column.selection(),
                        count,
                        capacity,
                    )?),)*
                }
            };
        }
        Ok(for_each_key_type!(build))
    }

    /// Move onto the first `count` selected rows of another column of the
    /// same key type. See [`MergeCursor::reset`].
    pub fn reset(&mut self, column: &'a KeyColumn, count: usize) -> MergeResult<()> {
        let expected = self.key_type();
        let this = self;
        macro_rules! reset {
            ($(($t:ty, $variant:ident, $scalar:ident)),*) => {
                match (this, column.data()) {
                    $((KeyCursor::$variant(c), KeyData::$variant(values)) => {
                        c.reset(values, column.selection(), count)
                    })*
                    (_, data) => Err(MergeError::KeyTypeMismatch {
                        expected,
                        found: data.key_type(),
                    }),
                }
            };
        }
        for_each_key_type!(reset)
    }

    /// Borrow the typed cursor, if this cursor runs over `T`.
    pub fn typed_mut<T: MergeKey>(&mut self) -> Option<&mut MergeCursor<'a, T>> {
        T::cursor_mut(self)
    }

    pub fn key_type(&self) -> DataType {
        match self {
            KeyCursor::Int8(_) => DataType::Int8,
            KeyCursor::Int16(_) => DataType::Int16,
            KeyCursor::Int32(_) => DataType::Int32,
            KeyCursor::Int64(_) => DataType::Int64,
            KeyCursor::UInt8(_) => DataType::UInt8,
            KeyCursor::UInt16(_) => DataType::UInt16,
            KeyCursor::UInt32(_) => DataType::UInt32,
            KeyCursor::UInt64(_) => DataType::UInt64,
            KeyCursor::Float32(_) => DataType::Float32,
            KeyCursor::Float64(_) => DataType::Float64,
        }
    }

    pub fn rewind(&mut self) {
        with_cursor!(self, c => c.rewind())
    }

    pub fn position(&self) -> usize {
        with_cursor!(self, c => c.position())
    }

    pub fn count(&self) -> usize {
        with_cursor!(self, c => c.count())
    }

    pub fn capacity(&self) -> usize {
        with_cursor!(self, c => c.capacity())
    }

    pub fn is_exhausted(&self) -> bool {
        with_cursor!(self, c => c.is_exhausted())
    }

    pub fn matches(&self) -> &[usize] {
        with_cursor!(self, c => c.matches())
    }
}
