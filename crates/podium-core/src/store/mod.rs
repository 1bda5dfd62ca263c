//! Optimistic transaction boundary over an external snapshot store.
//!
//! The leaderboard value is a single addressable snapshot per board (or one
//! composite value for the dual-metric pair). It is only ever mutated through
//! [`SnapshotStore::transact`]: the store reads the current value, invokes
//! the merge callback synchronously, and commits the returned value only if
//! the read value is still current. On conflict it re-invokes the callback
//! with the newer value; conflicts are invisible to the caller.
//!
//! The callback must perform no blocking I/O and complete promptly — it runs
//! inside the store's retry loop. [`MergeOutcome::NoChange`] aborts the
//! transaction with no write at all.

pub mod memory;

pub use memory::MemoryStore;

use crate::merge::MergeOutcome;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors a snapshot store surfaces to callers.
///
/// Transaction conflicts are handled internally by re-invoking the merge
/// callback and never reach the caller; only genuine unavailability does.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not complete the transaction at all. Retryable by the
    /// client.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a committed (or declined) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactOutcome {
    /// The callback's value was committed as the new snapshot.
    Committed(Value),
    /// The callback declined to write; the stored value is untouched.
    NoChange,
}

/// Conflict-resolution callback invoked with the latest committed value.
pub type MergeFn<'a> = dyn FnMut(Option<&Value>) -> MergeOutcome<Value> + Send + 'a;

/// A store exposing snapshot values through optimistic read-modify-write
/// transactions.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Runs `apply` inside a compare-and-retry transaction on `key`.
    ///
    /// `apply` receives the latest committed value (absent if the key has
    /// never been written) and is re-invoked with a fresh value every time a
    /// concurrent commit invalidates the read. Committed history across
    /// concurrent callers is serializable: no two commits ever apply to the
    /// same base value.
    async fn transact(
        &self,
        key: &str,
        apply: &mut MergeFn<'_>,
    ) -> Result<TransactOutcome, StoreError>;

    /// Non-transactional read used for best-effort feedback such as rank
    /// estimation. May observe a value older or newer than a just-committed
    /// write.
    async fn read(&self, key: &str) -> Result<Option<Value>, StoreError>;
}
