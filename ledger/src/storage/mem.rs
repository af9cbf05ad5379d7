//! In-memory chain store.
//!
//! This implementation is useful for unit tests and for throwaway ledgers.
//! It keeps the last written document in a byte buffer.

use crate::chain::error::StorageError;
use crate::chain::store::ChainStore;

/// In-memory implementation of [`ChainStore`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryChainStore {
    doc: Option<Vec<u8>>,
}

impl InMemoryChainStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `bytes`, as if previously written.
    pub fn with_contents(bytes: Vec<u8>) -> Self {
        Self { doc: Some(bytes) }
    }

    /// Returns the last written document, if any.
    pub fn contents(&self) -> Option<&[u8]> {
        self.doc.as_deref()
    }
}

impl ChainStore for InMemoryChainStore {
    fn read_all(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.doc.clone())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        self.doc = Some(bytes.to_vec());
        Ok(())
    }
}
