//! Chain orchestration.
//!
//! The chain wires together:
//!
//! - a [`ChainStore`] for persistence,
//! - a [`Clock`] for block timestamps,
//! - the integrity predicates in [`crate::validation`], and
//! - a [`LatestIndex`] for per-name lookups.
//!
//! It is the only place blocks are created, and it always persists the full
//! sequence before an append becomes visible.

use tracing::{debug, info};

use crate::types::{Block, BlockDraft, BlockHash};
use crate::validation::validate_chain;

use super::clock::{Clock, SystemClock};
use super::error::{ChainFault, LedgerError, StorageError};
use super::index::{LatestIndex, scan_latest};
use super::store::ChainStore;

/// Append-only, hash-linked block sequence bound to a store.
///
/// Generic over:
///
/// - `S`: persistence backend implementing [`ChainStore`],
/// - `C`: timestamp source implementing [`Clock`].
pub struct Chain<S, C = SystemClock> {
    store: S,
    clock: C,
    blocks: Vec<Block>,
    latest: LatestIndex,
}

impl<S, C> Chain<S, C>
where
    S: ChainStore,
    C: Clock,
{
    /// Loads and validates the persisted chain, or creates a genesis block.
    ///
    /// Fails with [`LedgerError::Malformed`] if the document cannot be
    /// decoded and [`LedgerError::Corrupted`] if it fails validation; a
    /// tampered chain is never operated on.
    pub fn open(store: S, clock: C) -> Result<Self, LedgerError> {
        match store.read_all()? {
            Some(bytes) => {
                let blocks: Vec<Block> =
                    serde_json::from_slice(&bytes).map_err(LedgerError::Malformed)?;
                info!(blocks = blocks.len(), "loaded chain");
                validate_chain(&blocks)?;

                let latest = LatestIndex::rebuild(&blocks);
                Ok(Self {
                    store,
                    clock,
                    blocks,
                    latest,
                })
            }
            None => {
                let mut chain = Self {
                    store,
                    clock,
                    blocks: Vec::new(),
                    latest: LatestIndex::new(),
                };
                let genesis = Block::genesis(chain.clock.now());
                chain.push_persisted(genesis)?;
                info!("genesis block created");
                Ok(chain)
            }
        }
    }

    /// Appends a block built from `draft` and persists the whole chain.
    ///
    /// `prev_hash` comes from the current tail and the hash is computed over
    /// the canonical content. If persisting fails the chain is unchanged.
    pub fn append(&mut self, draft: BlockDraft) -> Result<&Block, StorageError> {
        let prev_hash = self
            .tip()
            .map(|b| b.hash.clone())
            .unwrap_or_else(BlockHash::genesis_parent);
        let block = Block::seal(draft, self.clock.now(), prev_hash);
        debug!(
            index = self.blocks.len(),
            prediction = %block.prediction_name,
            hash = %block.hash,
            "appending block"
        );
        self.push_persisted(block)
    }

    fn push_persisted(&mut self, block: Block) -> Result<&Block, StorageError> {
        let position = self.blocks.len();
        self.blocks.push(block);

        if let Err(e) = self.persist() {
            self.blocks.pop();
            return Err(e);
        }

        let block = &self.blocks[position];
        self.latest.record(&block.prediction_name, position);
        Ok(block)
    }

    /// Rewrites the store with the full, pretty-printed block sequence.
    fn persist(&mut self) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(&self.blocks).map_err(StorageError::Encode)?;
        self.store.write_all(&bytes)
    }

    /// Returns the most recent block for `name`, if any.
    pub fn latest_block_for(&self, name: &str) -> Option<&Block> {
        self.latest.get(name).map(|i| &self.blocks[i])
    }

    /// Every block for `name`, oldest first.
    pub fn history<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| b.prediction_name == name)
    }

    /// Checks that the incremental index agrees with a backward scan.
    pub fn index_is_consistent(&self) -> bool {
        self.latest == LatestIndex::rebuild(&self.blocks)
            && self.blocks.iter().all(|b| {
                self.latest.get(&b.prediction_name)
                    == scan_latest(&self.blocks, &b.prediction_name)
            })
    }

    /// Re-validates the in-memory chain.
    pub fn verify(&self) -> Result<(), ChainFault> {
        validate_chain(&self.blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the chain, handing back its store.
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{FaultKind, FixedClock};
    use crate::storage::InMemoryChainStore;
    use crate::types::{AccessList, AccountId, Payload, Timestamp};
    use serde_json::Value;

    fn clock() -> FixedClock {
        FixedClock(Timestamp::parse("2025-11-11T18:00:00+00:00").expect("valid"))
    }

    fn draft(name: &str) -> BlockDraft {
        let mut payload = Payload::new();
        payload.insert("result", Value::from("Positive"));
        payload.set_owner(&AccountId::from("alice"));
        BlockDraft {
            prediction_name: name.to_string(),
            payload: Some(payload),
            access_list: AccessList::only(&AccountId::from("alice")),
        }
    }

    /// Store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryChainStore,
        fail_writes: bool,
    }

    impl ChainStore for FlakyStore {
        fn read_all(&self) -> Result<Option<Vec<u8>>, StorageError> {
            self.inner.read_all()
        }

        fn write_all(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.write_all(bytes)
        }
    }

    #[test]
    fn open_on_empty_store_creates_and_persists_genesis() {
        let chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");

        assert_eq!(chain.len(), 1);
        let genesis = chain.tip().expect("genesis");
        assert!(genesis.is_genesis());
        assert!(chain.store().contents().is_some());
    }

    #[test]
    fn append_links_to_tail_and_persists() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");
        let genesis_hash = chain.tip().expect("genesis").hash.clone();

        let block = chain.append(draft("p1")).expect("append").clone();
        assert_eq!(block.prev_hash, genesis_hash);
        assert!(block.has_valid_hash());
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.verify(), Ok(()));

        let persisted: Vec<Block> =
            serde_json::from_slice(chain.store().contents().expect("persisted")).expect("decode");
        assert_eq!(persisted, chain.blocks());
    }

    #[test]
    fn reload_roundtrip_is_field_for_field_equal() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");
        chain.append(draft("p1")).expect("append");
        chain.append(draft("p2")).expect("append");
        let original = chain.blocks().to_vec();

        let reopened = Chain::open(chain.into_store(), clock()).expect("reopen");
        assert_eq!(reopened.blocks(), original.as_slice());
        assert_eq!(reopened.verify(), Ok(()));
        assert!(reopened.index_is_consistent());
    }

    #[test]
    fn latest_block_for_returns_most_recent() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");
        chain.append(draft("p1")).expect("append");
        chain.append(draft("p2")).expect("append");
        let newest = chain.append(draft("p1")).expect("append").hash.clone();

        assert_eq!(chain.latest_block_for("p1").map(|b| &b.hash), Some(&newest));
        assert!(chain.latest_block_for("nope").is_none());
        assert_eq!(chain.history("p1").count(), 2);
        assert!(chain.index_is_consistent());
    }

    #[test]
    fn failed_persist_leaves_chain_unchanged() {
        let mut chain = Chain::open(FlakyStore::default(), clock()).expect("open");
        chain.append(draft("p1")).expect("append");
        let before = chain.blocks().to_vec();
        let persisted_before = chain.store().inner.contents().map(<[u8]>::to_vec);

        chain.store.fail_writes = true;
        let err = chain.append(draft("p2")).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));

        assert_eq!(chain.blocks(), before.as_slice());
        assert!(chain.latest_block_for("p2").is_none());
        assert_eq!(
            chain.store().inner.contents().map(<[u8]>::to_vec),
            persisted_before
        );
    }

    #[test]
    fn open_rejects_tampered_hash() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");
        chain.append(draft("p1")).expect("append");
        chain.append(draft("p1")).expect("append");

        let mut blocks = chain.blocks().to_vec();
        let flipped = if blocks[2].hash.0.starts_with('a') { "b" } else { "a" };
        blocks[2].hash.0.replace_range(0..1, flipped);
        let tampered = InMemoryChainStore::with_contents(
            serde_json::to_vec_pretty(&blocks).expect("encode"),
        );

        match Chain::open(tampered, clock()) {
            Err(LedgerError::Corrupted(fault)) => {
                assert_eq!(fault.index, 2);
                assert_eq!(fault.kind, FaultKind::HashMismatch);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("tampered chain was accepted"),
        }
    }

    #[test]
    fn open_rejects_malformed_and_empty_documents() {
        let garbage = InMemoryChainStore::with_contents(b"{not json".to_vec());
        assert!(matches!(
            Chain::open(garbage, clock()),
            Err(LedgerError::Malformed(_))
        ));

        let empty = InMemoryChainStore::with_contents(b"[]".to_vec());
        match Chain::open(empty, clock()) {
            Err(err) => assert!(err.is_corruption(), "unexpected error: {err}"),
            Ok(_) => panic!("empty chain was accepted"),
        }
    }

    fn persisted_text(chain: &Chain<InMemoryChainStore, FixedClock>) -> String {
        String::from_utf8(chain.store().contents().expect("persisted").to_vec()).expect("utf-8")
    }

    fn assert_refused(text: String, what: &str) {
        match Chain::open(InMemoryChainStore::with_contents(text.into_bytes()), clock()) {
            Err(err) => assert!(err.is_corruption(), "{what}: unexpected error: {err}"),
            Ok(_) => panic!("{what}: edited chain was accepted"),
        }
    }

    #[test]
    fn open_refuses_rewritten_timestamps_in_stored_text() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");
        chain.append(draft("p1")).expect("append");
        let text = persisted_text(&chain);
        let stored = "\"2025-11-11T18:00:00+00:00\"";
        assert!(text.contains(stored));

        for (edit, what) in [
            ("\"2025-11-11T18:00:00Z\"", "Z suffix"),
            ("\"2025-11-11T20:00:00+02:00\"", "+02:00 offset"),
            ("\"2025-11-11T18:00:00.999+00:00\"", "fractional seconds"),
        ] {
            assert_refused(text.replacen(stored, edit, 1), what);
        }
    }

    #[test]
    fn open_refuses_reordered_or_duplicated_access_lists() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");
        let mut d = draft("p1");
        d.access_list = d.access_list.with(&AccountId::from("bob"));
        chain.append(d).expect("append");

        let doc: Value = serde_json::from_str(&persisted_text(&chain)).expect("json");
        assert_eq!(doc[1]["access"], serde_json::json!(["alice", "bob"]));

        for (access, what) in [
            (serde_json::json!(["bob", "alice"]), "reordered"),
            (serde_json::json!(["alice", "alice", "bob"]), "duplicated"),
            (serde_json::json!(["bob", "alice", "alice"]), "both"),
        ] {
            let mut edited = doc.clone();
            edited[1]["access"] = access;
            assert_refused(serde_json::to_string_pretty(&edited).expect("encode"), what);
        }
    }

    #[test]
    fn open_refuses_added_or_removed_fields() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");
        chain.append(draft("p1")).expect("append");
        let doc: Value = serde_json::from_str(&persisted_text(&chain)).expect("json");

        let mut added = doc.clone();
        added[1]["comment"] = Value::from("edited");
        assert_refused(added.to_string(), "extra field");

        let mut removed = doc;
        if let Some(genesis) = removed[0].as_object_mut() {
            genesis.remove("prediction_data");
        }
        assert_refused(removed.to_string(), "missing prediction_data");
    }

    #[test]
    fn reload_accepts_full_precision_floats_and_big_integers() {
        let mut chain = Chain::open(InMemoryChainStore::new(), clock()).expect("open");

        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let mut next_float = move || loop {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let f = f64::from_bits(state);
            if f.is_finite() {
                return f;
            }
        };

        for i in 0..32 {
            let mut d = draft(&format!("p{i}"));
            if let Some(payload) = d.payload.as_mut() {
                payload.insert("confidence", Value::from(state_unit(i)));
                for k in 0..8 {
                    payload.insert(format!("f{k}"), Value::from(next_float()));
                }
            }
            chain.append(d).expect("append");
        }

        let mut d = draft("exact");
        if let Some(payload) = d.payload.as_mut() {
            for (key, text) in [
                ("a", "0.10957860598549463"),
                ("b", "1.0715660391465826e-75"),
                ("big", "123456789012345678901234567890"),
            ] {
                payload.insert(key, serde_json::from_str(text).expect("number"));
            }
        }
        chain.append(d).expect("append");
        let original = chain.blocks().to_vec();

        let reopened = Chain::open(chain.into_store(), clock()).expect("reopen");
        assert_eq!(reopened.verify(), Ok(()));
        assert_eq!(reopened.blocks(), original.as_slice());

        let exact = reopened.latest_block_for("exact").expect("exact");
        let canonical = String::from_utf8(exact.canonical_bytes()).expect("utf-8");
        assert!(canonical.contains(r#""big":123456789012345678901234567890"#));
        assert!(canonical.contains(r#""a":0.10957860598549463"#));
    }

    /// Values in `[0, 1)` with a full 53-bit mantissa, like a model confidence.
    fn state_unit(i: u64) -> f64 {
        let bits = (i + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}
