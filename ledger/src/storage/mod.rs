//! Storage backends for the ledger.
//!
//! This module provides concrete implementations of the
//! [`crate::chain::store::ChainStore`] trait:
//!
//! - an in-memory store ([`mem::InMemoryChainStore`]) suitable for tests,
//! - a file-backed store ([`file::FileChainStore`]) holding the whole chain
//!   as one JSON document.

pub mod file;
pub mod mem;

pub use file::{FileChainStore, FileStoreConfig};
pub use mem::InMemoryChainStore;
