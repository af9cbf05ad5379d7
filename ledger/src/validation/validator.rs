//! Per-block validity predicates.

use crate::chain::FaultKind;
use crate::types::Block;

/// Pluggable validity predicate for one block in chain position.
///
/// Implementations should be deterministic and side-effect free. `parent`
/// is the preceding block, or `None` for the block at index 0.
pub trait BlockValidator {
    fn validate(&self, block: &Block, parent: Option<&Block>) -> Result<(), FaultKind>;
}

/// A validator that composes two other validators.
///
/// `CombinedValidator { first, second }` runs `first.validate` and then
/// `second.validate`, failing fast on the first error.
#[derive(Clone, Debug, Default)]
pub struct CombinedValidator<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> CombinedValidator<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> BlockValidator for CombinedValidator<A, B>
where
    A: BlockValidator,
    B: BlockValidator,
{
    fn validate(&self, block: &Block, parent: Option<&Block>) -> Result<(), FaultKind> {
        self.first.validate(block, parent)?;
        self.second.validate(block, parent)?;
        Ok(())
    }
}
