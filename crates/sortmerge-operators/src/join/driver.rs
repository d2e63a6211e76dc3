//! Driving loop for a cursor pair.
//!
//! A kernel call emits at most one vector of pairs. The driver keeps calling
//! it with the same cursor state until a short call leaves one side
//! exhausted, forwarding each batch to the caller as it goes. Between
//! pairings the caller may move either side onto its next batch while the
//! other side keeps its position.

use serde::{Deserialize, Serialize};
use sortmerge_core::hash::PairDigest;
use sortmerge_core::join::JoinComparison;
use sortmerge_core::manifest::{now_ms, JoinManifest};

use super::cursor::KeyCursor;
use super::dispatch::MergeKernel;
use super::error::{MergeError, MergeResult};
use super::key::KeyColumn;

/// One bounded output batch: index-aligned physical offsets per side.
#[derive(Debug, Clone, Copy)]
pub struct MatchBatch<'b> {
    pub left: &'b [usize],
    pub right: &'b [usize],
}

impl<'b> MatchBatch<'b> {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + 'b {
        self.left.iter().copied().zip(self.right.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStats {
    /// Kernel invocations, including the final short one.
    pub calls: u64,
    /// Non-empty batches handed out.
    pub batches: u64,
    pub matches: u64,
}

pub struct MergeDriver<'a> {
    kernel: MergeKernel,
    left: KeyCursor<'a>,
    right: KeyCursor<'a>,
    finished: bool,
    stats: DriverStats,
    digest: PairDigest,
}

impl<'a> MergeDriver<'a> {
    pub fn new(kernel: MergeKernel, left: KeyCursor<'a>, right: KeyCursor<'a>) -> MergeResult<Self> {
        for side in [&left, &right] {
            if side.key_type() != kernel.key_type() {
                return Err(MergeError::KeyTypeMismatch {
                    expected: kernel.key_type(),
                    found: side.key_type(),
                });
            }
        }
        Ok(Self {
            kernel,
            left,
            right,
            finished: false,
            stats: DriverStats::default(),
            digest: PairDigest::new(),
        })
    }

    /// Resolve the kernel from the columns' key type and open cursors over
    /// every selected row, `vector_size` pairs per call.
    pub fn for_columns(
        left: &'a KeyColumn,
        right: &'a KeyColumn,
        comparison: JoinComparison,
        vector_size: usize,
    ) -> MergeResult<Self> {
        if left.key_type() != right.key_type() {
            return Err(MergeError::KeyTypeMismatch {
                expected: left.key_type(),
                found: right.key_type(),
            });
        }
        let kernel = MergeKernel::resolve(left.key_type(), comparison)?;
        Self::new(kernel, left.cursor(vector_size)?, right.cursor(vector_size)?)
    }

    /// Pairs per kernel call.
    pub fn capacity(&self) -> usize {
        self.left.capacity().min(self.right.capacity())
    }

    /// Run one kernel call. `None` once the pairing is drained.
    pub fn next_batch(&mut self) -> MergeResult<Option<MatchBatch<'_>>> {
        if self.finished {
            return Ok(None);
        }
        let n = self.kernel.merge(&mut self.left, &mut self.right)?;
        self.stats.calls += 1;

        if n < self.capacity() {
            if !self.kernel.is_drained(&self.left, &self.right) {
                return Err(MergeError::Invariant(format!(
                    "short merge call ({} < {}) with neither side exhausted \
                     (left {}/{}, right {}/{})",
                    n,
                    self.capacity(),
                    self.left.position(),
                    self.left.count(),
                    self.right.position(),
                    self.right.count()
                )));
            }
            self.finished = true;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            call = self.stats.calls,
            matches = n,
            left_pos = self.left.position(),
            right_pos = self.right.position(),
            finished = self.finished,
            "merge call"
        );

        if n == 0 {
            return Ok(None);
        }
        self.stats.batches += 1;
        self.stats.matches += n as u64;
        let left = &self.left.matches()[..n];
        let right = &self.right.matches()[..n];
        self.digest.update(left, right);
        Ok(Some(MatchBatch { left, right }))
    }

    /// Forward every remaining batch to `sink`.
    pub fn drain(&mut self, mut sink: impl FnMut(MatchBatch<'_>)) -> MergeResult<DriverStats> {
        while let Some(batch) = self.next_batch()? {
            sink(batch);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            comparison = %self.kernel.comparison(),
            key_type = %self.kernel.key_type(),
            calls = self.stats.calls,
            matches = self.stats.matches,
            "merge pairing drained"
        );

        Ok(self.stats)
    }

    /// Drain and accumulate every remaining pair.
    pub fn collect_pairs(&mut self) -> MergeResult<Vec<(usize, usize)>> {
        let mut pairs = Vec::new();
        self.drain(|batch| pairs.extend(batch.pairs()))?;
        Ok(pairs)
    }

    /// Move the left side onto its next batch, keeping the right position.
    pub fn reset_left(&mut self, column: &'a KeyColumn) -> MergeResult<()> {
        self.left.reset(column, column.len())?;
        self.finished = false;
        Ok(())
    }

    /// Move the right side onto its next batch, keeping the left position.
    pub fn reset_right(&mut self, column: &'a KeyColumn) -> MergeResult<()> {
        self.right.reset(column, column.len())?;
        self.finished = false;
        Ok(())
    }

    pub fn rewind_left(&mut self) {
        self.left.rewind();
        self.finished = false;
    }

    pub fn rewind_right(&mut self) {
        self.right.rewind();
        self.finished = false;
    }

    pub fn left(&self) -> &KeyCursor<'a> {
        &self.left
    }

    pub fn right(&self) -> &KeyCursor<'a> {
        &self.right
    }

    pub fn kernel(&self) -> &MergeKernel {
        &self.kernel
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Manifest for everything emitted so far.
    pub fn manifest(&self, started_ms: u64) -> JoinManifest {
        JoinManifest::new(
            self.kernel.comparison(),
            self.kernel.key_type(),
            self.capacity(),
            started_ms,
        )
        .finish(
            now_ms(),
            self.stats.calls,
            self.stats.matches,
            self.digest.finalize(),
        )
    }
}
