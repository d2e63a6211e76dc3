//! Deterministic join manifest for audit/replay.
//!
//! The driver fills one of these per drained pairing. Two runs over the same
//! inputs and comparison produce the same `outputs_digest` whatever vector
//! size they used.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::hash::{hash_serde, Hash256};
use crate::join::JoinComparison;
use crate::schema::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(pub Uuid);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinManifest {
    pub id: ManifestId,

    pub comparison: JoinComparison,
    pub key_type: DataType,

    /// Output capacity of each merge call.
    pub vector_size: usize,

    /// Engine version string for provenance.
    pub engine_version: String,

    /// Merge kernel invocations needed to drain the pairing.
    pub calls: u64,

    /// Total matched pairs.
    pub matches: u64,

    /// Digest of the emitted `(left, right)` offset sequence.
    pub outputs_digest: Option<Hash256>,

    /// Digest of the `EngineConfig` the run used, if recorded.
    pub config_hash: Option<Hash256>,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl JoinManifest {
    pub fn new(
        comparison: JoinComparison,
        key_type: DataType,
        vector_size: usize,
        started_ms: u64,
    ) -> Self {
        Self {
            id: ManifestId(Uuid::new_v4()),
            comparison,
            key_type,
            vector_size,
            engine_version: crate::VERSION.to_string(),
            calls: 0,
            matches: 0,
            outputs_digest: None,
            config_hash: None,
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(
        mut self,
        finished_ms: u64,
        calls: u64,
        matches: u64,
        outputs_digest: Hash256,
    ) -> Self {
        self.finished_ms = finished_ms;
        self.calls = calls;
        self.matches = matches;
        self.outputs_digest = Some(outputs_digest);
        self
    }

    /// Record which engine configuration produced this run.
    pub fn with_config(mut self, cfg: &EngineConfig) -> Result<Self> {
        self.config_hash = Some(hash_serde(cfg)?);
        Ok(self)
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_bytes;

    #[test]
    fn finish_fills_counters_and_duration() {
        let m = JoinManifest::new(JoinComparison::LessThan, DataType::Int32, 64, 1_000)
            .finish(1_250, 3, 130, hash_bytes(b"pairs"));
        assert_eq!(m.duration_ms(), 250);
        assert_eq!(m.calls, 3);
        assert_eq!(m.matches, 130);
        assert_eq!(m.engine_version, crate::VERSION);
    }

    #[test]
    fn config_hash_tracks_config() {
        let base = EngineConfig::default();
        let a = JoinManifest::new(JoinComparison::Equal, DataType::Int64, 8, 0)
            .with_config(&base)
            .unwrap();
        let b = JoinManifest::new(JoinComparison::Equal, DataType::Int64, 8, 0)
            .with_config(&base.clone().with_vector_size(8))
            .unwrap();
        assert!(a.config_hash.is_some());
        assert_ne!(a.config_hash, b.config_hash);

        let json = serde_json::to_string(&a).unwrap();
        let back: JoinManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.config_hash, a.config_hash);
        assert_eq!(back.id, a.id);
    }
}
