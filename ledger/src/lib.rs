//! Ledger library crate.
//!
//! This crate provides a patient-owned, append-only, hash-linked ledger of
//! prediction records with owner-controlled access lists:
//!
//! - strongly-typed domain types and canonical hashing (`types`),
//! - the ledger store: chain engine, persistence seam, clock, errors (`chain`),
//! - chain integrity predicates (`validation`),
//! - storage backends (`storage`),
//! - the prediction registry and its access-control rules (`registry`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level configuration (`config`).
//!
//! Binaries compose these pieces; see `main.rs` for a demo driver and the
//! `api-gateway` crate for an HTTP front end.

pub mod chain;
pub mod config;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export top-level configuration types.
pub use config::{LedgerConfig, MetricsConfig};

// Re-export the ledger store and its error taxonomy.
pub use chain::{
    Action, Chain, ChainFault, ChainStore, Clock, FaultKind, FixedClock, LedgerError,
    StorageError, SystemClock,
};

// Re-export storage backends.
pub use storage::{FileChainStore, FileStoreConfig, InMemoryChainStore};

// Re-export the registry.
pub use registry::{AccessSnapshot, AccessUpdate, PredictionRegistry, RegistryConfig};

// Re-export validation entry points.
pub use validation::{is_valid, validate_chain};

// Re-export metrics.
pub use metrics::{LedgerMetrics, MetricsRegistry};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the default, file-backed registry.
pub type DefaultRegistry = PredictionRegistry<FileChainStore, SystemClock>;
