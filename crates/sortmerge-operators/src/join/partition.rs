//! Join independent sorted partitions in parallel.
//!
//! Each partition pair gets its own cursors and driver on whichever worker
//! picks it up; workers share nothing but the index of the next partition.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use sortmerge_core::config::EngineConfig;
use sortmerge_core::join::JoinComparison;

use super::driver::MergeDriver;
use super::error::{MergeError, MergeResult};
use super::key::KeyColumn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionMatches {
    pub partition: usize,
    /// `(left, right)` physical offsets within the partition's own columns.
    pub pairs: Vec<(usize, usize)>,
}

/// Merge-join every `(left, right)` partition on up to
/// `cfg.max_parallel_tasks` threads. Results come back in partition order.
pub fn join_partitions(
    partitions: &[(KeyColumn, KeyColumn)],
    comparison: JoinComparison,
    cfg: &EngineConfig,
) -> MergeResult<Vec<PartitionMatches>> {
    cfg.validate()?;
    if partitions.is_empty() {
        return Ok(Vec::new());
    }
    let workers = cfg.max_parallel_tasks.min(partitions.len());
    let vector_size = cfg.vector_size;
    let next_partition = AtomicUsize::new(0);
    let next = &next_partition;

    let per_worker: Vec<MergeResult<Vec<PartitionMatches>>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                s.spawn(move || -> MergeResult<Vec<PartitionMatches>> {
                    let mut done = Vec::new();
                    loop {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        let Some((left, right)) = partitions.get(idx) else {
                            break;
                        };
                        let pairs = MergeDriver::for_columns(left, right, comparison, vector_size)?
                            .collect_pairs()?;

                        #[cfg(feature = "tracing")]
                        tracing::trace!(partition = idx, matches = pairs.len(), "partition joined");

                        done.push(PartitionMatches {
                            partition: idx,
                            pairs,
                        });
                    }
                    Ok(done)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    Err(MergeError::Invariant("partition worker panicked".into()))
                })
            })
            .collect()
    });

    let mut out = Vec::with_capacity(partitions.len());
    for worker in per_worker {
        out.extend(worker?);
    }
    out.sort_by_key(|p| p.partition);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_come_back_in_order() {
        let parts: Vec<_> = (0..9i64)
            .map(|p| {
                (
                    KeyColumn::new(vec![p, p, p + 1]),
                    KeyColumn::new(vec![p - 1, p, p + 1]),
                )
            })
            .collect();
        let cfg = EngineConfig::default()
            .with_max_parallel_tasks(3)
            .with_vector_size(2);
        let out = join_partitions(&parts, JoinComparison::Equal, &cfg).unwrap();
        assert_eq!(out.len(), 9);
        for (i, p) in out.iter().enumerate() {
            assert_eq!(p.partition, i);
            assert_eq!(p.pairs, vec![(0, 1), (1, 1), (2, 2)]);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let parts = vec![(KeyColumn::new(vec![1u8]), KeyColumn::new(vec![1u8]))];
        let cfg = EngineConfig::default().with_max_parallel_tasks(0);
        assert!(matches!(
            join_partitions(&parts, JoinComparison::Equal, &cfg),
            Err(MergeError::Core(_))
        ));
    }

    #[test]
    fn one_bad_partition_fails_the_join() {
        let parts = vec![
            (KeyColumn::new(vec![1i32]), KeyColumn::new(vec![1i32])),
            (KeyColumn::new(vec![1i32]), KeyColumn::new(vec![1i64])),
        ];
        let cfg = EngineConfig::default().with_max_parallel_tasks(2);
        assert!(join_partitions(&parts, JoinComparison::Equal, &cfg).is_err());
    }
}
