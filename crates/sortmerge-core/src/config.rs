//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of matched pairs a single merge call may emit.
///
/// Every output buffer handed to the merge engine is sized to the configured
/// vector size, which defaults to this.
pub const STANDARD_VECTOR_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Output capacity of one merge call (matched pairs per batch).
    pub vector_size: usize,

    /// Worker threads used when joining independent partitions.
    pub max_parallel_tasks: usize,

    /// Keep null join keys out of the selection vectors.
    pub exclude_nulls: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vector_size: STANDARD_VECTOR_SIZE,
            max_parallel_tasks: 4,
            exclude_nulls: true,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SORTMERGE_VECTOR_SIZE`: matched pairs per merge call
    /// - `SORTMERGE_MAX_PARALLEL_TASKS`: partition join parallelism
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("SORTMERGE_VECTOR_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.vector_size = v;
            }
        }

        if let Ok(s) = std::env::var("SORTMERGE_MAX_PARALLEL_TASKS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_parallel_tasks = v;
            }
        }

        cfg
    }

    pub fn with_vector_size(mut self, vector_size: usize) -> Self {
        self.vector_size = vector_size;
        self
    }

    pub fn with_max_parallel_tasks(mut self, tasks: usize) -> Self {
        self.max_parallel_tasks = tasks;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.vector_size == 0 {
            return Err(Error::Config("vector_size must be at least 1".into()));
        }
        if self.max_parallel_tasks == 0 {
            return Err(Error::Config("max_parallel_tasks must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.vector_size, STANDARD_VECTOR_SIZE);
        assert!(cfg.exclude_nulls);
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_vector_size_rejected() {
        let cfg = EngineConfig::default().with_vector_size(0);
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn serde_roundtrip_keeps_overrides() {
        let cfg = EngineConfig::default()
            .with_vector_size(7)
            .with_max_parallel_tasks(2);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
