//! Ledger store: the append-only, hash-linked block sequence.
//!
//! This module provides:
//!
//! - the [`engine::Chain`] that owns the blocks, appends and persists them,
//! - the [`store::ChainStore`] persistence seam,
//! - the [`clock::Clock`] timestamp source,
//! - the [`index::LatestIndex`] used for latest-block lookups,
//! - and the error taxonomy ([`error::LedgerError`] and friends).

pub mod clock;
pub mod engine;
pub mod error;
pub mod index;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::Chain;
pub use error::{Action, ChainFault, FaultKind, LedgerError, StorageError};
pub use index::{LatestIndex, scan_latest};
pub use store::ChainStore;
