// ledger/src/types/block.rs

//! Block types and hashing.
//!
//! This module defines the block record persisted by the ledger together
//! with its canonical hashing routine.
//!
//! Field names on the wire (`prediction_data`, `access`,
//! `current_transac_ts`) differ from the Rust field names; the serde
//! attributes below are the persisted layout and must not drift.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::canonical::to_canonical_bytes;
use super::{AccessList, BlockHash, Payload, Timestamp};

/// `prediction_name` of the genesis block.
pub const GENESIS_NAME: &str = "genesis_block";

/// One immutable, hash-linked entry in the chain.
///
/// Decoding is strict: unknown fields and a missing `prediction_data` are
/// errors rather than being dropped or defaulted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    /// Groups the blocks describing one prediction's history.
    pub prediction_name: String,

    /// Prediction payload; `None` only for the genesis block.
    #[serde(rename = "prediction_data", deserialize_with = "Option::deserialize")]
    pub payload: Option<Payload>,

    /// Accounts allowed to read the payload as of this block.
    #[serde(rename = "access")]
    pub access_list: AccessList,

    /// Creation time (UTC, whole seconds).
    #[serde(rename = "current_transac_ts")]
    pub timestamp: Timestamp,

    /// Hash of the preceding block, or `"0"` for genesis.
    pub prev_hash: BlockHash,

    /// Digest of every other field of this block.
    pub hash: BlockHash,
}

/// Block content supplied by callers of `Chain::append`.
///
/// The ledger fills in the timestamp, `prev_hash` and `hash`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockDraft {
    pub prediction_name: String,
    pub payload: Option<Payload>,
    pub access_list: AccessList,
}

impl Block {
    /// Seals a block: links it to `prev_hash` and computes its hash.
    pub fn seal(draft: BlockDraft, timestamp: Timestamp, prev_hash: BlockHash) -> Self {
        let mut block = Block {
            prediction_name: draft.prediction_name,
            payload: draft.payload,
            access_list: draft.access_list,
            timestamp,
            prev_hash,
            hash: BlockHash(String::new()),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Builds the genesis block anchoring a new chain.
    pub fn genesis(timestamp: Timestamp) -> Self {
        let draft = BlockDraft {
            prediction_name: GENESIS_NAME.to_string(),
            payload: None,
            access_list: AccessList::new(),
        };
        Self::seal(draft, timestamp, BlockHash::genesis_parent())
    }

    /// Returns the hash material: every field except `hash`, as JSON.
    ///
    /// Built by hand rather than through `serde_json::to_value` so that it
    /// is infallible.
    pub fn hash_material(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "access".to_string(),
            Value::Array(
                self.access_list
                    .iter()
                    .map(|a| Value::String(a.0.clone()))
                    .collect(),
            ),
        );
        map.insert(
            "current_transac_ts".to_string(),
            Value::String(self.timestamp.to_string()),
        );
        map.insert(
            "prediction_data".to_string(),
            match &self.payload {
                Some(payload) => Value::Object(payload.0.clone()),
                None => Value::Null,
            },
        );
        map.insert(
            "prediction_name".to_string(),
            Value::String(self.prediction_name.clone()),
        );
        map.insert(
            "prev_hash".to_string(),
            Value::String(self.prev_hash.0.clone()),
        );
        Value::Object(map)
    }

    /// Returns the canonical byte representation hashed by [`Block::compute_hash`].
    pub fn canonical_bytes(&self) -> Vec<u8> {
        to_canonical_bytes(&self.hash_material())
    }

    /// Computes the SHA-256 hash of this block's canonical content.
    ///
    /// The stored `hash` field is ignored, so this can be compared against
    /// it to detect tampering.
    pub fn compute_hash(&self) -> BlockHash {
        BlockHash::compute(&self.canonical_bytes())
    }

    /// Returns `true` if the stored hash matches the recomputed one.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.prediction_name == GENESIS_NAME && self.payload.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, OWNER_FIELD};

    fn fixed_ts() -> Timestamp {
        Timestamp::parse("2025-11-11T18:00:00+00:00").expect("valid timestamp")
    }

    fn sample_draft() -> BlockDraft {
        let mut payload = Payload::new();
        payload.insert("result", Value::from("Positive"));
        payload.insert("confidence", Value::from(0.81));
        payload.set_owner(&AccountId::from("patient123"));

        BlockDraft {
            prediction_name: "diabetes_pred".to_string(),
            payload: Some(payload),
            access_list: AccessList::only(&AccountId::from("patient123")),
        }
    }

    #[test]
    fn block_hash_is_deterministic() {
        let a = Block::seal(sample_draft(), fixed_ts(), BlockHash::genesis_parent());
        let b = Block::seal(sample_draft(), fixed_ts(), BlockHash::genesis_parent());
        assert_eq!(a.hash, b.hash);
        assert!(a.has_valid_hash());
    }

    #[test]
    fn canonical_bytes_exclude_hash_and_sort_keys() {
        let block = Block::genesis(fixed_ts());
        let text = String::from_utf8(block.canonical_bytes()).expect("utf-8");
        assert_eq!(
            text,
            r#"{"access":[],"current_transac_ts":"2025-11-11T18:00:00+00:00","prediction_data":null,"prediction_name":"genesis_block","prev_hash":"0"}"#
        );
    }

    #[test]
    fn genesis_block_shape() {
        let genesis = Block::genesis(fixed_ts());
        assert!(genesis.is_genesis());
        assert_eq!(genesis.prev_hash.as_str(), "0");
        assert!(genesis.access_list.is_empty());
        assert_eq!(genesis.hash, BlockHash::compute(&genesis.canonical_bytes()));
    }

    #[test]
    fn wire_layout_uses_persisted_field_names() {
        let block = Block::seal(sample_draft(), fixed_ts(), BlockHash::genesis_parent());
        let v = serde_json::to_value(&block).expect("serialize");
        let obj = v.as_object().expect("object");

        for key in [
            "prediction_name",
            "prediction_data",
            "access",
            "current_transac_ts",
            "prev_hash",
            "hash",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 6);
        assert_eq!(v["prediction_data"][OWNER_FIELD], "patient123");
    }

    #[test]
    fn any_field_change_changes_the_hash() {
        let block = Block::seal(sample_draft(), fixed_ts(), BlockHash::genesis_parent());

        let mut renamed = block.clone();
        renamed.prediction_name.push('x');
        assert!(!renamed.has_valid_hash());

        let mut widened = block.clone();
        widened.access_list = widened.access_list.with(&AccountId::from("mallory"));
        assert!(!widened.has_valid_hash());

        let mut edited = block.clone();
        if let Some(payload) = edited.payload.as_mut() {
            payload.insert("result", Value::from("Negative"));
        }
        assert!(!edited.has_valid_hash());

        let mut relinked = block;
        relinked.prev_hash = BlockHash("1".to_string());
        assert!(!relinked.has_valid_hash());
    }

    #[test]
    fn decoding_rejects_unknown_and_missing_fields() {
        let block = Block::genesis(fixed_ts());
        let mut v = serde_json::to_value(&block).expect("serialize");
        assert!(serde_json::from_value::<Block>(v.clone()).is_ok());

        v["note"] = Value::from("added later");
        assert!(serde_json::from_value::<Block>(v.clone()).is_err());

        if let Some(obj) = v.as_object_mut() {
            obj.remove("note");
            obj.remove("prediction_data");
        }
        assert!(serde_json::from_value::<Block>(v).is_err());
    }

    #[test]
    fn serde_roundtrip_preserves_hash() {
        let block = Block::seal(sample_draft(), fixed_ts(), BlockHash::genesis_parent());
        let text = serde_json::to_string_pretty(&block).expect("serialize");
        let back: Block = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, block);
        assert!(back.has_valid_hash());
    }
}
