//! In-process snapshot store with versioned compare-and-swap commits.
//!
//! Each key maps to a versioned slot. A transaction reads the slot's version
//! and value, releases the lock, invokes the merge callback, and commits only
//! if the version is unchanged — otherwise the callback is re-invoked with
//! the newer value. This makes the in-memory store exercise the same
//! optimistic protocol an external store would, rather than serializing
//! callers behind a lock for the duration of the callback.

use super::{MergeFn, SnapshotStore, StoreError, TransactOutcome};
use crate::merge::MergeOutcome;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry as SlotEntry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};

/// Default number of conflict retries before reporting the store unavailable.
///
/// Conflicts on a single hot key resolve in one or two retries in practice;
/// the budget exists so a pathological livelock surfaces as an error instead
/// of spinning forever.
pub const DEFAULT_RETRY_BUDGET: usize = 32;

#[derive(Debug, Clone)]
struct Slot {
    version: u64,
    value: Value,
}

/// In-memory [`SnapshotStore`] backed by a sharded map of versioned slots.
#[derive(Debug)]
pub struct MemoryStore {
    slots: DashMap<String, Slot>,
    max_retries: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_retry_budget(DEFAULT_RETRY_BUDGET)
    }

    /// Creates a store that gives up after `max_retries` conflict retries.
    #[must_use]
    pub fn with_retry_budget(max_retries: usize) -> Self {
        Self {
            slots: DashMap::new(),
            max_retries,
        }
    }

    /// Installs a value directly, bypassing the transaction protocol.
    ///
    /// Intended for fixtures and migration backfills. Live traffic must go
    /// through [`SnapshotStore::transact`] or the leaderboard invariants are
    /// not preserved; a concurrent transaction that already read the key will
    /// observe the seed as a conflict and retry.
    pub fn seed(&self, key: &str, value: Value) {
        match self.slots.entry(key.to_string()) {
            SlotEntry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                slot.version += 1;
                slot.value = value;
            }
            SlotEntry::Vacant(vacant) => {
                vacant.insert(Slot { version: 1, value });
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn transact(
        &self,
        key: &str,
        apply: &mut MergeFn<'_>,
    ) -> Result<TransactOutcome, StoreError> {
        for attempt in 0..=self.max_retries {
            // Snapshot the slot, then release the shard lock before the
            // callback runs: the callback must face the optimistic protocol,
            // not a critical section.
            let read = self
                .slots
                .get(key)
                .map(|slot| (slot.version, slot.value.clone()));

            let next = match apply(read.as_ref().map(|(_, value)| value)) {
                MergeOutcome::NoChange => return Ok(TransactOutcome::NoChange),
                MergeOutcome::Changed(next) => next,
            };

            let expected = read.map(|(version, _)| version);
            match self.slots.entry(key.to_string()) {
                SlotEntry::Occupied(mut occupied) => {
                    if Some(occupied.get().version) == expected {
                        let slot = occupied.get_mut();
                        slot.version += 1;
                        slot.value = next.clone();
                        return Ok(TransactOutcome::Committed(next));
                    }
                }
                SlotEntry::Vacant(vacant) => {
                    if expected.is_none() {
                        vacant.insert(Slot { version: 1, value: next.clone() });
                        return Ok(TransactOutcome::Committed(next));
                    }
                    // The slot was removed between read and commit; retry
                    // against the now-absent value.
                }
            }

            debug!(key, attempt, "snapshot changed under transaction, retrying with fresh value");
        }

        warn!(key, budget = self.max_retries, "transaction retry budget exhausted");
        Err(StoreError::Unavailable(format!(
            "transaction on {key:?} exceeded {} retries",
            self.max_retries
        )))
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.slots.get(key).map(|slot| slot.value.clone()))
    }
}
