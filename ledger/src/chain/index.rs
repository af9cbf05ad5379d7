//! Name → latest-block index.
//!
//! Maintained incrementally on every append and rebuildable from a full
//! replay of the chain, so lookups of the current state of a prediction do
//! not depend on chain length.

use std::collections::HashMap;

use crate::types::Block;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LatestIndex {
    positions: HashMap<String, usize>,
}

impl LatestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays `blocks` in order; later blocks win.
    pub fn rebuild(blocks: &[Block]) -> Self {
        let mut index = Self::new();
        for (position, block) in blocks.iter().enumerate() {
            index.record(&block.prediction_name, position);
        }
        index
    }

    /// Marks `position` as the latest block for `name`.
    pub fn record(&mut self, name: &str, position: usize) {
        self.positions.insert(name.to_string(), position);
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Number of distinct names indexed.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Finds the latest block for `name` by scanning from the tail.
pub fn scan_latest(blocks: &[Block], name: &str) -> Option<usize> {
    blocks.iter().rposition(|b| b.prediction_name == name)
}
