//! Stable hashing helpers for configs, manifests, and match output digests.

use blake3::Hasher;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    let mut h = Hasher::new();
    h.update(bytes);
    Hash256(h.finalize().into())
}

/// Hash any serde-serializable value deterministically (via JSON).
pub fn hash_serde<T: Serialize>(v: &T) -> Result<Hash256, crate::error::Error> {
    let bytes = serde_json::to_vec(v)?;
    Ok(hash_bytes(&bytes))
}

/// Incremental digest over a sequence of matched `(left, right)` row offsets.
///
/// Fed one output batch at a time, so the digest only depends on the pair
/// sequence and not on how it was chunked into batches.
#[derive(Default)]
pub struct PairDigest {
    hasher: Hasher,
    pairs: u64,
}

impl PairDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one batch. `left` and `right` are parallel arrays of offsets.
    pub fn update(&mut self, left: &[usize], right: &[usize]) {
        debug_assert_eq!(left.len(), right.len());
        for (&l, &r) in left.iter().zip(right) {
            self.hasher.update(&(l as u64).to_le_bytes());
            self.hasher.update(&(r as u64).to_le_bytes());
        }
        self.pairs += left.len() as u64;
    }

    pub fn pairs(&self) -> u64 {
        self.pairs
    }

    pub fn finalize(&self) -> Hash256 {
        Hash256(self.hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_digest_ignores_chunking() {
        let left = [0usize, 0, 1, 2, 2];
        let right = [3usize, 4, 4, 0, 1];

        let mut whole = PairDigest::new();
        whole.update(&left, &right);

        let mut chunked = PairDigest::new();
        for i in 0..left.len() {
            chunked.update(&left[i..i + 1], &right[i..i + 1]);
        }

        assert_eq!(whole.finalize(), chunked.finalize());
        assert_eq!(chunked.pairs(), 5);
    }

    #[test]
    fn pair_digest_is_order_sensitive() {
        let mut a = PairDigest::new();
        a.update(&[0, 1], &[1, 0]);
        let mut b = PairDigest::new();
        b.update(&[1, 0], &[0, 1]);
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn hex_is_64_chars() {
        assert_eq!(hash_bytes(b"sortmerge").to_hex().len(), 64);
    }
}
