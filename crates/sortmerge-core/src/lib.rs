#![forbid(unsafe_code)]
//! sortmerge-core: shared vocabulary for the sortmerge engine.
//!
//! Pure data and small helpers only: schemas, lightweight row batches, the
//! join comparison selector, engine configuration, stable hashing and the
//! per-run join manifest. No I/O and no execution logic live here.

pub mod config;
pub mod error;
pub mod hash;
pub mod join;
pub mod manifest;
pub mod prelude;
pub mod schema;
pub mod types;

/// Engine version string recorded in manifests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
