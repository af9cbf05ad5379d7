//! Prediction registry: access control layered on the ledger store.
//!
//! Each prediction name has its own history inside the shared chain:
//!
//! - unrecorded → recorded via [`PredictionRegistry::record_prediction`],
//! - recorded → recorded (access list changed) via
//!   [`PredictionRegistry::grant_access`] and
//!   [`PredictionRegistry::revoke_access`], any number of times.
//!
//! Only the owner named in the payload may change the access list. Every
//! change is a new block, so who could read a record at any point in time
//! can be reconstructed with [`PredictionRegistry::access_history`].

mod config;

pub use config::RegistryConfig;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::chain::{Action, Chain, ChainFault, ChainStore, Clock, LedgerError, SystemClock};
use crate::metrics::LedgerMetrics;
use crate::types::{AccessList, AccountId, Block, BlockDraft, BlockHash, Payload, Timestamp};

/// Outcome of a grant or revoke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessUpdate {
    /// A new block carrying the updated access list was appended.
    Appended(BlockHash),
    /// The access list already had the requested shape; nothing was written.
    Unchanged,
}

impl AccessUpdate {
    pub fn is_appended(&self) -> bool {
        matches!(self, AccessUpdate::Appended(_))
    }
}

/// One historical access-list state of a prediction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessSnapshot {
    pub hash: BlockHash,
    pub timestamp: Timestamp,
    pub access_list: AccessList,
}

/// Domain operations over a [`Chain`].
pub struct PredictionRegistry<S, C = SystemClock> {
    chain: Chain<S, C>,
    config: RegistryConfig,
    metrics: Option<LedgerMetrics>,
}

impl<S, C> PredictionRegistry<S, C>
where
    S: ChainStore,
    C: Clock,
{
    pub fn new(chain: Chain<S, C>, config: RegistryConfig) -> Self {
        Self {
            chain,
            config,
            metrics: None,
        }
    }

    /// Opens (or initializes) the chain in `store` and wraps it.
    pub fn open(store: S, clock: C, config: RegistryConfig) -> Result<Self, LedgerError> {
        Ok(Self::new(Chain::open(store, clock)?, config))
    }

    /// Reports appends, denials and validation timings to `metrics`.
    pub fn with_metrics(mut self, metrics: LedgerMetrics) -> Self {
        metrics.chain_length.set(self.chain.len() as i64);
        self.metrics = Some(metrics);
        self
    }

    /// Returns a reference to the underlying chain.
    pub fn chain(&self) -> &Chain<S, C> {
        &self.chain
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Records a new prediction owned by `owner`.
    ///
    /// `owner_id` is stamped into the payload and the access list starts as
    /// `[owner]`. Re-recording an existing name starts a new latest block
    /// for it unless [`RegistryConfig::reject_rerecord`] is set.
    pub fn record_prediction(
        &mut self,
        owner: &AccountId,
        prediction_name: &str,
        mut payload: Payload,
    ) -> Result<BlockHash, LedgerError> {
        if self.chain.latest_block_for(prediction_name).is_some() {
            if self.config.reject_rerecord {
                return Err(LedgerError::AlreadyRecorded(prediction_name.to_string()));
            }
            warn!(
                prediction = prediction_name,
                owner = %owner,
                "re-recording existing prediction; previous history is superseded"
            );
        }

        payload.set_owner(owner);
        let draft = BlockDraft {
            prediction_name: prediction_name.to_string(),
            payload: Some(payload),
            access_list: AccessList::only(owner),
        };
        let hash = self.append(draft)?;
        info!(prediction = prediction_name, owner = %owner, "recorded prediction");
        Ok(hash)
    }

    /// Adds `account` to the access list. Owner only; idempotent.
    pub fn grant_access(
        &mut self,
        requester: &AccountId,
        prediction_name: &str,
        account: &AccountId,
    ) -> Result<AccessUpdate, LedgerError> {
        let latest = self.owned_latest(requester, prediction_name, Action::Grant)?;
        if latest.access_list.contains(account) {
            debug!(prediction = prediction_name, account = %account, "account already has access");
            return Ok(AccessUpdate::Unchanged);
        }

        let draft = BlockDraft {
            prediction_name: prediction_name.to_string(),
            payload: latest.payload.clone(),
            access_list: latest.access_list.with(account),
        };
        let hash = self.append(draft)?;
        info!(prediction = prediction_name, account = %account, "granted access");
        Ok(AccessUpdate::Appended(hash))
    }

    /// Removes `account` from the access list. Owner only; idempotent.
    pub fn revoke_access(
        &mut self,
        requester: &AccountId,
        prediction_name: &str,
        account: &AccountId,
    ) -> Result<AccessUpdate, LedgerError> {
        let latest = self.owned_latest(requester, prediction_name, Action::Revoke)?;
        if !latest.access_list.contains(account) {
            debug!(prediction = prediction_name, account = %account, "account has no access to revoke");
            return Ok(AccessUpdate::Unchanged);
        }

        let draft = BlockDraft {
            prediction_name: prediction_name.to_string(),
            payload: latest.payload.clone(),
            access_list: latest.access_list.without(account),
        };
        let hash = self.append(draft)?;
        info!(prediction = prediction_name, account = %account, "revoked access");
        Ok(AccessUpdate::Appended(hash))
    }

    /// Returns a copy of the latest payload if `requester` may read it.
    ///
    /// Allowed iff the requester is the owner or on the latest access list.
    pub fn read_prediction(
        &self,
        requester: &AccountId,
        prediction_name: &str,
    ) -> Result<Payload, LedgerError> {
        let latest = self.latest(prediction_name)?;
        let payload = latest.payload.as_ref();
        let is_owner = payload.and_then(Payload::owner).as_ref() == Some(requester);

        if is_owner || latest.access_list.contains(requester) {
            return Ok(payload.cloned().unwrap_or_default());
        }
        Err(self.denied(requester, prediction_name, Action::Read))
    }

    /// Copy of the latest access list; empty if the prediction does not exist.
    pub fn current_access(&self, prediction_name: &str) -> AccessList {
        self.chain
            .latest_block_for(prediction_name)
            .map(|b| b.access_list.clone())
            .unwrap_or_default()
    }

    /// Every access-list state of `prediction_name`, oldest first.
    pub fn access_history(&self, prediction_name: &str) -> Vec<AccessSnapshot> {
        self.chain
            .history(prediction_name)
            .map(|b| AccessSnapshot {
                hash: b.hash.clone(),
                timestamp: b.timestamp,
                access_list: b.access_list.clone(),
            })
            .collect()
    }

    /// Re-validates the whole chain, tracing the outcome.
    pub fn verify(&self) -> Result<(), ChainFault> {
        let start = Instant::now();
        let outcome = self.chain.verify();
        if let Some(metrics) = &self.metrics {
            metrics
                .validation_seconds
                .observe(start.elapsed().as_secs_f64());
        }
        match &outcome {
            Ok(()) => info!(blocks = self.chain.len(), "chain integrity OK"),
            Err(fault) => warn!(index = fault.index, "chain integrity check failed: {}", fault.kind),
        }
        outcome
    }

    fn latest(&self, prediction_name: &str) -> Result<&Block, LedgerError> {
        self.chain
            .latest_block_for(prediction_name)
            .ok_or_else(|| LedgerError::NotFound(prediction_name.to_string()))
    }

    /// Latest block for `prediction_name`, if `requester` owns it.
    ///
    /// Returns an owned copy so the caller can append while holding it.
    fn owned_latest(
        &self,
        requester: &AccountId,
        prediction_name: &str,
        action: Action,
    ) -> Result<Block, LedgerError> {
        let latest = self.latest(prediction_name)?;
        let owner = latest.payload.as_ref().and_then(Payload::owner);
        if owner.as_ref() != Some(requester) {
            return Err(self.denied(requester, prediction_name, action));
        }
        Ok(latest.clone())
    }

    fn denied(&self, requester: &AccountId, prediction_name: &str, action: Action) -> LedgerError {
        warn!(
            requester = %requester,
            prediction = prediction_name,
            "denied: not authorized to {action}"
        );
        if let Some(metrics) = &self.metrics {
            metrics.access_denied.inc();
        }
        LedgerError::Unauthorized {
            requester: requester.clone(),
            prediction: prediction_name.to_string(),
            action,
        }
    }

    fn append(&mut self, draft: BlockDraft) -> Result<BlockHash, LedgerError> {
        let hash = self.chain.append(draft)?.hash.clone();
        if let Some(metrics) = &self.metrics {
            metrics.blocks_appended.inc();
            metrics.chain_length.set(self.chain.len() as i64);
        }
        Ok(hash)
    }
}
