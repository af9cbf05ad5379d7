//! Persistence abstraction used by the ledger store.

use super::error::StorageError;

/// Durable, key-less blob store holding the serialized chain.
///
/// Implementations can be backed by a flat file, an in-memory buffer, etc.
/// The interface is intentionally small: the ledger always reads and
/// rewrites the whole document.
pub trait ChainStore {
    /// Returns the persisted document, or `None` if nothing was written yet.
    fn read_all(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replaces the persisted document with `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StorageError>;
}

impl<T: ChainStore + ?Sized> ChainStore for Box<T> {
    fn read_all(&self) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).read_all()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).write_all(bytes)
    }
}
