//! Error types for the ledger store and the prediction registry.

use std::fmt;

use thiserror::Error;

use crate::types::AccountId;

/// Failure reported by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying read or write failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The in-memory chain could not be encoded for persistence.
    #[error("failed to encode chain: {0}")]
    Encode(#[source] serde_json::Error),
}

/// What made a chain fail integrity validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FaultKind {
    /// The chain has no blocks, so there is no genesis anchor.
    Empty,
    /// The first block does not carry the `"0"` parent sentinel.
    GenesisLink,
    /// The stored hash differs from the recomputed one.
    HashMismatch,
    /// `prev_hash` differs from the preceding block's stored hash.
    PrevHashMismatch,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Empty => f.write_str("chain has no genesis block"),
            FaultKind::GenesisLink => f.write_str("genesis prev_hash is not the \"0\" sentinel"),
            FaultKind::HashMismatch => f.write_str("hash mismatch"),
            FaultKind::PrevHashMismatch => f.write_str("prev_hash mismatch"),
        }
    }
}

/// First integrity fault found in a chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("block {index}: {kind}")]
pub struct ChainFault {
    pub index: usize,
    pub kind: FaultKind,
}

/// Registry operation named in authorization failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Grant,
    Revoke,
    Read,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Grant => f.write_str("grant access to"),
            Action::Revoke => f.write_str("revoke access to"),
            Action::Read => f.write_str("read"),
        }
    }
}

/// High-level errors returned by the ledger and the registry.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Persisted chain failed hash or link validation.
    #[error("chain is corrupted: {0}")]
    Corrupted(#[from] ChainFault),
    /// Persisted chain could not be decoded at all.
    #[error("persisted chain is malformed: {0}")]
    Malformed(#[source] serde_json::Error),
    /// No block exists for the named prediction.
    #[error("prediction not found: {0}")]
    NotFound(String),
    /// Requester is not the owner (grant/revoke) or not on the access list (read).
    #[error("'{requester}' is not authorized to {action} '{prediction}'")]
    Unauthorized {
        requester: AccountId,
        prediction: String,
        action: Action,
    },
    /// Re-recording an existing prediction while that is disallowed.
    #[error("prediction already recorded: {0}")]
    AlreadyRecorded(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    /// Corruption-class errors: the chain must not be operated on.
    pub fn is_corruption(&self) -> bool {
        matches!(self, LedgerError::Corrupted(_) | LedgerError::Malformed(_))
    }
}
