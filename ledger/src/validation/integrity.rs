//! Hash and link integrity checks over a whole chain.

use tracing::{info, warn};

use crate::chain::{ChainFault, FaultKind};
use crate::types::{Block, GENESIS_PREV_HASH};

use super::validator::{BlockValidator, CombinedValidator};

/// Recomputes each block's hash and compares it with the stored one.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashValidity;

impl BlockValidator for HashValidity {
    fn validate(&self, block: &Block, _parent: Option<&Block>) -> Result<(), FaultKind> {
        if block.has_valid_hash() {
            Ok(())
        } else {
            Err(FaultKind::HashMismatch)
        }
    }
}

/// Checks that each block points at its predecessor's stored hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkValidity;

impl BlockValidator for LinkValidity {
    fn validate(&self, block: &Block, parent: Option<&Block>) -> Result<(), FaultKind> {
        match parent {
            None if block.prev_hash.as_str() != GENESIS_PREV_HASH => Err(FaultKind::GenesisLink),
            None => Ok(()),
            Some(parent) if block.prev_hash != parent.hash => Err(FaultKind::PrevHashMismatch),
            Some(_) => Ok(()),
        }
    }
}

/// Hash check first, then linkage, per block.
pub type DefaultValidator = CombinedValidator<HashValidity, LinkValidity>;

/// Runs `validator` over `blocks` in order and returns the first fault.
///
/// An empty chain is a fault: every valid chain starts with genesis.
pub fn validate_with<V: BlockValidator>(validator: &V, blocks: &[Block]) -> Result<(), ChainFault> {
    if blocks.is_empty() {
        return Err(ChainFault {
            index: 0,
            kind: FaultKind::Empty,
        });
    }

    let mut parent = None;
    for (index, block) in blocks.iter().enumerate() {
        validator
            .validate(block, parent)
            .map_err(|kind| ChainFault { index, kind })?;
        parent = Some(block);
    }
    Ok(())
}

/// Validates `blocks` with the [`DefaultValidator`].
pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainFault> {
    validate_with(&DefaultValidator::default(), blocks)
}

/// Boolean form of [`validate_chain`]; `verbose` traces the outcome.
pub fn is_valid(blocks: &[Block], verbose: bool) -> bool {
    match validate_chain(blocks) {
        Ok(()) => {
            if verbose {
                info!(blocks = blocks.len(), "chain integrity OK");
            }
            true
        }
        Err(fault) => {
            if verbose {
                warn!(index = fault.index, "chain integrity check failed: {}", fault.kind);
            }
            false
        }
    }
}
