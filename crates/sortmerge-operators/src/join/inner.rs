//! Inner merge kernels over two cursors sorted ascending on the same key.
//!
//! Each call writes at most `min(left.capacity(), right.capacity())` matched
//! offset pairs (one entry per cursor output buffer, index-aligned) and
//! returns how many it wrote. Positions persist in the cursors, so calling
//! again continues exactly where the previous call stopped.
//!
//! None of these validate sortedness; unsorted input gives wrong pairs, not
//! a panic.

use std::cmp::Ordering;

use super::cursor::MergeCursor;
use super::key::MergeKey;

/// A merge kernel, generic over the key type.
pub trait MergeOp {
    const NAME: &'static str;

    fn merge<T: MergeKey>(left: &mut MergeCursor<'_, T>, right: &mut MergeCursor<'_, T>) -> usize;
}

pub struct Equality;
pub struct LessThan;
pub struct LessThanEquals;

impl MergeOp for Equality {
    const NAME: &'static str = "equality";

    fn merge<T: MergeKey>(left: &mut MergeCursor<'_, T>, right: &mut MergeCursor<'_, T>) -> usize {
        equality(left, right)
    }
}

impl MergeOp for LessThan {
    const NAME: &'static str = "less_than";

    fn merge<T: MergeKey>(left: &mut MergeCursor<'_, T>, right: &mut MergeCursor<'_, T>) -> usize {
        less_than(left, right)
    }
}

impl MergeOp for LessThanEquals {
    const NAME: &'static str = "less_than_equals";

    fn merge<T: MergeKey>(left: &mut MergeCursor<'_, T>, right: &mut MergeCursor<'_, T>) -> usize {
        less_than_equals(left, right)
    }
}

#[inline]
fn emit<T: MergeKey>(
    left: &mut MergeCursor<'_, T>,
    right: &mut MergeCursor<'_, T>,
    written: usize,
) {
    left.matches[written] = left.offset(left.position);
    right.matches[written] = right.offset(right.position);
}

/// Emit every `(l, r)` with `key(l) == key(r)`, all duplicate combinations.
///
/// The right cursor walks forward and steps back over the run of right keys
/// equal to a new left key, so a left duplicate sees the same right run its
/// predecessor saw. Every backward step is followed by a match, which keeps
/// the total work linear in input plus output size.
///
/// Stops when the left side is exhausted or the output buffer is full. An
/// empty right side returns 0 without moving the left cursor.
pub fn equality<T: MergeKey>(left: &mut MergeCursor<'_, T>, right: &mut MergeCursor<'_, T>) -> usize {
    if left.position >= left.count || right.count == 0 {
        return 0;
    }
    let capacity = left.capacity().min(right.capacity());
    let mut written = 0;
    loop {
        let ord = if right.position >= right.count {
            Ordering::Less
        } else {
            left.key(left.position).merge_cmp(&right.key(right.position))
        };
        match ord {
            Ordering::Less => {
                left.position += 1;
                if left.position >= left.count {
                    break;
                }
                let lkey = left.key(left.position);
                while right.position > 0
                    && lkey.merge_cmp(&right.key(right.position - 1)) == Ordering::Equal
                {
                    right.position -= 1;
                }
            }
            Ordering::Greater => {
                right.position += 1;
            }
            Ordering::Equal => {
                emit(left, right, written);
                written += 1;
                right.position += 1;
                if written == capacity {
                    break;
                }
            }
        }
    }
    written
}

/// Emit every `(l, r)` with `key(l) < key(r)`.
///
/// Right is the outer side: for each right key the left side is scanned from
/// its first position while left keys stay below it. Worst case is
/// O(left × right), which is inherent to the output size of a range join.
///
/// Stops when the right side is exhausted or the output buffer is full. An
/// empty left side returns 0 without moving the right cursor.
pub fn less_than<T: MergeKey>(left: &mut MergeCursor<'_, T>, right: &mut MergeCursor<'_, T>) -> usize {
    range_merge(left, right, |ord| ord == Ordering::Less)
}

/// Same as [`less_than`] with `key(l) <= key(r)`.
pub fn less_than_equals<T: MergeKey>(
    left: &mut MergeCursor<'_, T>,
    right: &mut MergeCursor<'_, T>,
) -> usize {
    range_merge(left, right, |ord| ord != Ordering::Greater)
}

#[inline]
fn range_merge<T: MergeKey>(
    left: &mut MergeCursor<'_, T>,
    right: &mut MergeCursor<'_, T>,
    accept: impl Fn(Ordering) -> bool,
) -> usize {
    if right.position >= right.count || left.count == 0 {
        return 0;
    }
    let capacity = left.capacity().min(right.capacity());
    let mut written = 0;
    loop {
        if left.position < left.count
            && accept(left.key(left.position).merge_cmp(&right.key(right.position)))
        {
            emit(left, right, written);
            written += 1;
            left.position += 1;
            if written == capacity {
                break;
            }
        } else {
            // left is sorted, so nothing past here matches this right key
            left.position = 0;
            right.position += 1;
            if right.position >= right.count {
                break;
            }
        }
    }
    written
}
