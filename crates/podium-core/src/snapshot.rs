//! Snapshot Normalizer: canonicalizes store-returned values of unknown shape.
//!
//! A leaderboard slot read back from the store may be:
//!
//! - **Empty**: absent or JSON `null` — no leaderboard exists yet.
//! - **List**: the canonical ordered array of entries. Sparse arrays with
//!   `null` slots (a known artifact of map-to-array coercion in some stores)
//!   are tolerated; the `null` slots are dropped.
//! - **Map**: a legacy keyed mapping of participant id → partial entry
//!   fields. The participant id is backfilled from the map key when the
//!   stored value omits it.
//!
//! All three resolve to one canonical `Vec` of entries before any business
//! logic runs. Missing optional fields never fail: a missing metric reads as
//! `0` and a missing name as the empty string. Stored order is preserved;
//! descending order is re-established by the merge engine's sort step, not
//! assumed here. No side effects.

use crate::types::{DualEntry, Entry};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// The three shapes a stored leaderboard value can take.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBoard<E> {
    /// Canonical array representation; `null` slots are skipped.
    List(Vec<Option<E>>),
    /// Legacy keyed representation: participant id → partial entry.
    Map(BTreeMap<String, E>),
}

/// Entry types the normalizer can resolve from a raw snapshot.
trait FromSnapshot: DeserializeOwned {
    fn participant_id_mut(&mut self) -> &mut String;
}

impl FromSnapshot for Entry {
    fn participant_id_mut(&mut self) -> &mut String {
        &mut self.participant_id
    }
}

impl FromSnapshot for DualEntry {
    fn participant_id_mut(&mut self) -> &mut String {
        &mut self.participant_id
    }
}

/// Normalizes a single-metric leaderboard value into its canonical entry list.
#[must_use]
pub fn normalize(raw: Option<&Value>) -> Vec<Entry> {
    normalize_as(raw)
}

/// Normalizes one half of a dual-metric pair into its canonical entry list.
#[must_use]
pub fn normalize_dual(raw: Option<&Value>) -> Vec<DualEntry> {
    normalize_as(raw)
}

/// Normalizes the dual-metric composite value into its two entry lists.
///
/// Accepts an absent or `null` pair (no leaderboard yet) and tolerates either
/// sub-list being absent or stored in any raw shape.
#[must_use]
pub fn normalize_pair(raw: Option<&Value>) -> (Vec<DualEntry>, Vec<DualEntry>) {
    let Some(value) = raw else {
        return (Vec::new(), Vec::new());
    };
    (
        normalize_dual(value.get("byPrimary")),
        normalize_dual(value.get("bySecondary")),
    )
}

fn normalize_as<E: FromSnapshot>(raw: Option<&Value>) -> Vec<E> {
    let value = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(value) => value,
    };
    match serde_json::from_value::<RawBoard<E>>(value.clone()) {
        Ok(RawBoard::List(slots)) => slots.into_iter().flatten().collect(),
        Ok(RawBoard::Map(map)) => map
            .into_iter()
            .map(|(key, mut entry)| {
                if entry.participant_id_mut().is_empty() {
                    *entry.participant_id_mut() = key;
                }
                entry
            })
            .collect(),
        Err(err) => {
            warn!(%err, "unreadable leaderboard snapshot, treating as empty");
            Vec::new()
        }
    }
}
