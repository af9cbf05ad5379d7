//! Core domain types used by the ledger.
//!
//! This module defines strongly-typed account identifiers, block hashes,
//! timestamps, prediction payloads and access lists that are shared across
//! the ledger implementation. The goal is to avoid "naked" strings and maps
//! in public APIs and instead use domain-specific newtypes.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Block types and hashing.
pub mod block;
/// Deterministic JSON encoding used as hash material.
pub mod canonical;

pub use block::{Block, BlockDraft, GENESIS_NAME};

/// Payload field holding the account that recorded a prediction.
pub const OWNER_FIELD: &str = "owner_id";

/// `prev_hash` sentinel carried by the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

/// Account identifier (patient, doctor, or any other reader).
///
/// Identifiers are opaque strings; the ledger never interprets them beyond
/// equality and ordering.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        AccountId(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        AccountId(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex-encoded SHA-256 block hash.
///
/// Stored as the string that appears on the wire rather than as raw bytes:
/// a tampered hash that is no longer valid hex must still load, so that
/// validation (not parsing) is what reports it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(pub String);

impl BlockHash {
    /// SHA-256 of `data`, lowercase hex.
    pub fn compute(data: &[u8]) -> Self {
        BlockHash(hex::encode(Sha256::digest(data)))
    }

    /// The `"0"` parent link of the genesis block.
    pub fn genesis_parent() -> Self {
        BlockHash(GENESIS_PREV_HASH.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected block timestamp text.
#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("invalid timestamp: {0}")]
    Parse(#[from] chrono::ParseError),
    #[error("timestamp not in canonical form: {0:?}")]
    NonCanonical(String),
}

/// UTC block timestamp with whole-second precision.
///
/// Serialized as `YYYY-MM-DDTHH:MM:SS+00:00`. The text form is part of the
/// hash material, so formatting must never change for a given instant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    const FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S+00:00";

    /// Wraps `at`, dropping any sub-second component.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Timestamp(at.trunc_subsecs(0))
    }

    /// Parses the exact wire form `YYYY-MM-DDTHH:MM:SS+00:00`.
    ///
    /// Other spellings of the same instant (`Z`, other offsets, fractional
    /// seconds, unpadded fields) are rejected: the text is hash material,
    /// and normalizing it on load would hide edits to a stored chain.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        let naive = NaiveDateTime::parse_from_str(s, Self::FORMAT)?;
        let ts = Timestamp(naive.and_utc());
        if ts.to_string() != s {
            return Err(TimestampError::NonCanonical(s.to_string()));
        }
        Ok(ts)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Structured prediction payload (`prediction_data` on the wire).
///
/// Arbitrary domain data plus the [`OWNER_FIELD`] stamped in at record
/// time. Cloning is a deep copy, so payloads handed out by the registry
/// never alias stored state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(pub Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the owner recorded in this payload, if it holds a string.
    pub fn owner(&self) -> Option<AccountId> {
        self.0
            .get(OWNER_FIELD)
            .and_then(Value::as_str)
            .map(AccountId::from)
    }

    /// Sets the owner field, replacing any caller-supplied value.
    pub fn set_owner(&mut self, owner: &AccountId) {
        self.0
            .insert(OWNER_FIELD.to_string(), Value::String(owner.0.clone()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload(map)
    }
}

/// Accounts allowed to read a prediction (`access` on the wire).
///
/// Always sorted and free of duplicates; it serializes as a plain JSON
/// array of strings. Decoding only accepts arrays that are already strictly
/// ascending, so a stored list is never silently reordered or deduplicated.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccessList(BTreeSet<AccountId>);

impl AccessList {
    pub fn new() -> Self {
        Self::default()
    }

    /// An access list holding a single account.
    pub fn only(account: &AccountId) -> Self {
        let mut list = Self::new();
        list.0.insert(account.clone());
        list
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.0.contains(account)
    }

    /// Returns a copy with `account` added.
    pub fn with(&self, account: &AccountId) -> Self {
        let mut next = self.clone();
        next.0.insert(account.clone());
        next
    }

    /// Returns a copy with `account` removed.
    pub fn without(&self, account: &AccountId) -> Self {
        let mut next = self.clone();
        next.0.remove(account);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Account identifiers in sorted order.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().map(|a| a.0.clone()).collect()
    }
}

impl<'de> Deserialize<'de> for AccessList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let accounts = Vec::<AccountId>::deserialize(deserializer)?;
        if let Some(pair) = accounts.windows(2).find(|w| w[0] >= w[1]) {
            return Err(serde::de::Error::custom(format!(
                "access list not strictly ascending at {:?}, {:?}",
                pair[0].0, pair[1].0
            )));
        }
        Ok(AccessList(accounts.into_iter().collect()))
    }
}

impl<A: Into<AccountId>> FromIterator<A> for AccessList {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        AccessList(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn block_hash_is_lowercase_sha256_hex() {
        let h = BlockHash::compute(b"abc");
        assert_eq!(
            h.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn timestamp_uses_explicit_utc_offset_and_drops_subseconds() {
        let at = Utc
            .with_ymd_and_hms(2025, 11, 11, 18, 0, 0)
            .single()
            .expect("valid date")
            + chrono::Duration::milliseconds(750);
        let ts = Timestamp::from_datetime(at);
        assert_eq!(ts.to_string(), "2025-11-11T18:00:00+00:00");
    }

    #[test]
    fn timestamp_parse_roundtrips_wire_form() {
        let ts = Timestamp::parse("2025-11-11T18:00:00+00:00").expect("parse");
        assert_eq!(ts.to_string(), "2025-11-11T18:00:00+00:00");
    }

    #[test]
    fn timestamp_parse_rejects_other_spellings_of_the_same_instant() {
        for raw in [
            "2025-11-11T18:00:00Z",
            "2025-11-11T20:00:00+02:00",
            "2025-11-11T18:00:00.999+00:00",
            "2025-11-11T18:00:00.000+00:00",
            "2025-11-11 18:00:00+00:00",
            "2025-11-11T18:0:00+00:00",
        ] {
            assert!(Timestamp::parse(raw).is_err(), "accepted {raw}");
        }
    }

    #[test]
    fn timestamp_deserialize_is_strict() {
        let ok: Timestamp =
            serde_json::from_str(r#""2025-11-11T18:00:00+00:00""#).expect("canonical");
        assert_eq!(ok.to_string(), "2025-11-11T18:00:00+00:00");
        assert!(serde_json::from_str::<Timestamp>(r#""2025-11-11T18:00:00Z""#).is_err());
    }

    #[test]
    fn access_list_decoding_rejects_unsorted_or_duplicate_entries() {
        let ok: AccessList = serde_json::from_str(r#"["alice","bob"]"#).expect("sorted");
        assert_eq!(ok.to_vec(), vec!["alice", "bob"]);

        let empty: AccessList = serde_json::from_str("[]").expect("empty");
        assert!(empty.is_empty());

        for raw in [r#"["bob","alice"]"#, r#"["alice","alice"]"#, r#"["bob","alice","alice"]"#] {
            assert!(serde_json::from_str::<AccessList>(raw).is_err(), "accepted {raw}");
        }
    }

    #[test]
    fn access_list_is_sorted_and_deduplicated() {
        let list: AccessList = ["carol", "alice", "bob", "alice"].into_iter().collect();
        assert_eq!(list.to_vec(), vec!["alice", "bob", "carol"]);

        let json = serde_json::to_string(&list).expect("serialize");
        assert_eq!(json, r#"["alice","bob","carol"]"#);
    }

    #[test]
    fn access_list_updates_return_copies() {
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        let base = AccessList::only(&alice);

        let granted = base.with(&bob);
        assert!(!base.contains(&bob));
        assert!(granted.contains(&bob));

        let revoked = granted.without(&bob);
        assert_eq!(revoked, base);
    }

    #[test]
    fn payload_owner_requires_string_value() {
        let mut payload = Payload::new();
        assert!(payload.owner().is_none());

        payload.insert(OWNER_FIELD, Value::from(42));
        assert!(payload.owner().is_none());

        payload.set_owner(&AccountId::from("alice"));
        assert_eq!(payload.owner(), Some(AccountId::from("alice")));
    }
}
