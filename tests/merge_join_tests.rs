//! Merge engine properties against a nested-loop reference.


use std::collections::HashSet;

use sortmerge_core::config::EngineConfig;
use sortmerge_core::join::JoinComparison;
use sortmerge_operators::{join_partitions, KeyColumn, MergeDriver, MergeError};
use test_data_gen::{brute_force, is_ascending, sorted, sorted_keys, Lcg};

const OPS: [JoinComparison; 5] = [
    JoinComparison::Equal,
    JoinComparison::LessThan,
    JoinComparison::LessThanOrEqual,
    JoinComparison::GreaterThan,
    JoinComparison::GreaterThanOrEqual,
];

fn run(left: &KeyColumn, right: &KeyColumn, op: JoinComparison, cap: usize) -> Vec<(usize, usize)> {
    MergeDriver::for_columns(left, right, op, cap)
        .expect("driver setup")
        .collect_pairs()
        .expect("drain")
}

#[test]
fn test_completeness_against_brute_force() {
    for seed in 0..12u64 {
        let l = sorted_keys(seed, (seed as usize * 7) % 41, 9);
        let r = sorted_keys(seed + 100, (seed as usize * 5) % 37, 9);
        assert!(is_ascending(&l) && is_ascending(&r));
        let (lk, rk) = (KeyColumn::new(l.clone()), KeyColumn::new(r.clone()));

        for op in OPS {
            let expected = brute_force(&l, &r, op);
            for cap in [1, 3, 1000] {
                let got = run(&lk, &rk, op, cap);
                let unique: HashSet<_> = got.iter().copied().collect();
                assert_eq!(unique.len(), got.len(), "duplicate pair, op {} cap {}", op, cap);
                assert_eq!(sorted(got), expected, "seed {} op {} cap {}", seed, op, cap);
            }
        }
    }
}

#[test]
fn test_equality_many_to_many_any_chunking() {
    let l = KeyColumn::new(vec![1i32, 1, 2]);
    let r = KeyColumn::new(vec![1i32, 1, 2, 2]);
    let reference = run(&l, &r, JoinComparison::Equal, 1000);
    assert_eq!(reference.len(), 6);
    for cap in 1..=7 {
        assert_eq!(run(&l, &r, JoinComparison::Equal, cap), reference);
    }
}

#[test]
fn test_capacity_one_matches_capacity_thousand() {
    let l = sorted_keys(7, 60, 15);
    let r = sorted_keys(8, 45, 15);
    let (lk, rk) = (KeyColumn::new(l), KeyColumn::new(r));
    for op in OPS {
        let small: HashSet<_> = run(&lk, &rk, op, 1).into_iter().collect();
        let large: HashSet<_> = run(&lk, &rk, op, 1000).into_iter().collect();
        assert_eq!(small, large, "op {}", op);
    }
}

#[test]
fn test_strict_boundary() {
    let five = KeyColumn::new(vec![5u64]);
    assert!(run(&five, &five, JoinComparison::LessThan, 8).is_empty());
    assert_eq!(run(&five, &five, JoinComparison::LessThanOrEqual, 8), vec![(0, 0)]);
    assert!(run(&five, &five, JoinComparison::GreaterThan, 8).is_empty());
    assert_eq!(run(&five, &five, JoinComparison::GreaterThanOrEqual, 8), vec![(0, 0)]);
}

#[test]
fn test_empty_side_yields_nothing_and_leaves_other_side() {
    let full = KeyColumn::new(vec![1i16, 2, 3]);
    let empty = KeyColumn::new(Vec::<i16>::new());
    for op in OPS {
        let mut d = MergeDriver::for_columns(&full, &empty, op, 4).unwrap();
        assert!(d.next_batch().unwrap().is_none());
        assert!(d.is_finished());
        assert_eq!(d.left().position(), 0, "op {}", op);

        let mut d = MergeDriver::for_columns(&empty, &full, op, 4).unwrap();
        assert!(d.next_batch().unwrap().is_none());
        assert_eq!(d.right().position(), 0, "op {}", op);
    }
}

#[test]
fn test_chunked_match_counts_sum_to_unbounded_count() {
    let lk = KeyColumn::new(sorted_keys(21, 80, 6));
    let rk = KeyColumn::new(sorted_keys(22, 70, 6));
    for op in OPS {
        let mut whole = MergeDriver::for_columns(&lk, &rk, op, 1 << 16).unwrap();
        let total = whole.drain(|_| {}).unwrap().matches;

        let mut chunked = MergeDriver::for_columns(&lk, &rk, op, 16).unwrap();
        let mut sum = 0u64;
        let stats = chunked
            .drain(|b| {
                assert!(b.len() <= 16);
                sum += b.len() as u64;
            })
            .unwrap();
        assert_eq!(sum, total);
        assert_eq!(stats.matches, total);
        assert_eq!(whole.stats().calls, 1);
    }
}

#[test]
fn test_selection_vector_indirection() {
    // Shuffle physical storage; the selection restores sorted order.
    let logical = sorted_keys(3, 30, 8);
    let mut rng = Lcg::new(99);
    let mut perm: Vec<usize> = (0..logical.len()).collect();
    for i in (1..perm.len()).rev() {
        perm.swap(i, rng.below(i as u64 + 1) as usize);
    }
    // physical[perm[i]] = logical[i]
    let mut physical = vec![0i64; logical.len()];
    for (i, &p) in perm.iter().enumerate() {
        physical[p] = logical[i];
    }
    let left = KeyColumn::with_selection(physical.clone(), perm.clone()).unwrap();
    let right = KeyColumn::new(sorted_keys(4, 25, 8));
    let rkeys = sorted_keys(4, 25, 8);

    for op in OPS {
        let got = sorted(run(&left, &right, op, 5));
        let expected = sorted(
            brute_force(&logical, &rkeys, op)
                .into_iter()
                .map(|(l, r)| (perm[l], r))
                .collect(),
        );
        assert_eq!(got, expected, "op {}", op);
        for (l, r) in got {
            assert!(op.holds(physical[l].cmp(&rkeys[r])));
        }
    }
}

#[test]
fn test_float_keys() {
    let l: Vec<f64> = sorted_keys(5, 30, 12).into_iter().map(|k| k as f64 / 2.0).collect();
    let r: Vec<f64> = sorted_keys(6, 30, 12).into_iter().map(|k| k as f64 / 4.0 - 1.0).collect();
    let (lk, rk) = (KeyColumn::new(l.clone()), KeyColumn::new(r.clone()));
    for op in OPS {
        assert_eq!(sorted(run(&lk, &rk, op, 7)), brute_force(&l, &r, op), "op {}", op);
    }
}

#[test]
fn test_not_equal_rejected_at_setup() {
    let k = KeyColumn::new(vec![1i8]);
    assert!(matches!(
        MergeDriver::for_columns(&k, &k, JoinComparison::NotEqual, 8),
        Err(MergeError::UnsupportedComparison(_))
    ));
}

#[test]
fn test_streamed_left_batches_against_one_right_batch() {
    let all_left = sorted_keys(31, 50, 10);
    let right = sorted_keys(32, 40, 10);
    let rk = KeyColumn::new(right.clone());
    let chunks: Vec<KeyColumn> = all_left.chunks(9).map(|c| KeyColumn::new(c.to_vec())).collect();

    let mut d = MergeDriver::for_columns(&chunks[0], &rk, JoinComparison::Equal, 4).unwrap();
    let mut got = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            d.reset_left(chunk).unwrap();
            d.rewind_right();
        }
        d.drain(|b| got.extend(b.pairs().map(|(l, r)| (i * 9 + l, r))))
            .unwrap();
    }
    assert_eq!(sorted(got), brute_force(&all_left, &right, JoinComparison::Equal));
}

#[test]
fn test_partitions_match_per_partition_reference() {
    let parts: Vec<(Vec<i64>, Vec<i64>)> = (0..10u64)
        .map(|p| (sorted_keys(p, 20, 5), sorted_keys(p + 50, 15, 5)))
        .collect();
    let columns: Vec<(KeyColumn, KeyColumn)> = parts
        .iter()
        .map(|(l, r)| (KeyColumn::new(l.clone()), KeyColumn::new(r.clone())))
        .collect();
    let cfg = EngineConfig::default()
        .with_vector_size(8)
        .with_max_parallel_tasks(4);

    for op in OPS {
        let out = join_partitions(&columns, op, &cfg).unwrap();
        assert_eq!(out.len(), parts.len());
        for (m, (l, r)) in out.into_iter().zip(&parts) {
            assert_eq!(sorted(m.pairs), brute_force(l, r, op));
        }
    }
}

#[test]
fn test_manifest_digest_independent_of_vector_size() {
    let lk = KeyColumn::new(sorted_keys(41, 40, 7));
    let rk = KeyColumn::new(sorted_keys(42, 40, 7));

    let mut a = MergeDriver::for_columns(&lk, &rk, JoinComparison::LessThanOrEqual, 1).unwrap();
    a.drain(|_| {}).unwrap();
    let mut b = MergeDriver::for_columns(&lk, &rk, JoinComparison::LessThanOrEqual, 333).unwrap();
    b.drain(|_| {}).unwrap();

    let (ma, mb) = (a.manifest(0), b.manifest(0));
    assert_eq!(ma.matches, mb.matches);
    assert_eq!(ma.outputs_digest, mb.outputs_digest);
    assert_ne!(ma.id, mb.id);
    assert_eq!(ma.vector_size, 1);

    let json = serde_json::to_string(&ma).unwrap();
    let back: sortmerge_core::manifest::JoinManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(back.outputs_digest, ma.outputs_digest);
}
