//! Core type definitions for leaderboard entries and validated submissions.
//!
//! # Invariants
//!
//! Every observable leaderboard value satisfies, per list:
//!
//! - `len <= capacity` (default [`CAPACITY`])
//! - no two entries share a `participant_id`
//! - entries are sorted descending by the list's ranked metric
//!
//! The [`merge`](crate::merge) module is the only code that transitions a
//! list from one valid state to the next; these types only carry the data.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Maximum number of entries a leaderboard retains.
pub const CAPACITY: usize = 20;

/// Display names longer than this are truncated on write.
pub const MAX_NAME_LEN: usize = 50;

/// Placeholder used when a submission carries no display name.
pub const ANONYMOUS: &str = "Anonymous";

/// Returns the current wall-clock time as epoch milliseconds.
///
/// Captured fresh on every merge invocation, including conflict retries; used
/// only for eviction tie-breaking, never for ranking order.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Truncates a display name to at most `max_len` characters.
///
/// Operates on characters rather than bytes so multi-byte names are never cut
/// mid-codepoint.
#[must_use]
pub fn clamp_name(name: &str, max_len: usize) -> String {
    name.chars().take(max_len).collect()
}

/// Behaviour the bounded-ranked-list algorithm needs from an entry type.
///
/// Implemented by [`Entry`] and [`DualEntry`] so one generic algorithm serves
/// the single-metric board and both halves of the dual-metric pair.
pub trait Ranked: Clone {
    /// Opaque unique key; at most one entry per participant per list.
    fn participant_id(&self) -> &str;

    /// Epoch-millisecond timestamp of the last admission or update.
    fn submitted_at(&self) -> i64;

    /// Stored display name, consulted when a submission omits one.
    fn display_name(&self) -> &str;
}

/// One participant's ranked record on a single-metric leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub participant_id: String,

    #[serde(default)]
    pub display_name: String,

    /// Non-negative integer score; ranked descending.
    #[serde(default)]
    pub metric: u64,

    /// Epoch milliseconds, recorded when the merge decision was evaluated.
    #[serde(default)]
    pub submitted_at: i64,
}

impl Ranked for Entry {
    fn participant_id(&self) -> &str {
        &self.participant_id
    }

    fn submitted_at(&self) -> i64 {
        self.submitted_at
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// One participant's record in the dual-metric variant.
///
/// Carries both metrics alongside the same participant/name/timestamp; each
/// half of a [`BoardPair`] ranks by its own metric and ignores the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualEntry {
    #[serde(default)]
    pub participant_id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub primary_metric: u64,

    #[serde(default)]
    pub secondary_metric: u64,

    #[serde(default)]
    pub submitted_at: i64,
}

impl Ranked for DualEntry {
    fn participant_id(&self) -> &str {
        &self.participant_id
    }

    fn submitted_at(&self) -> i64 {
        self.submitted_at
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Composite stored value for the dual-metric variant.
///
/// The store commits the pair as a single unit; the two lists are capped and
/// sorted independently and a submission may change one, both, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPair {
    #[serde(default)]
    pub by_primary: Vec<DualEntry>,

    #[serde(default)]
    pub by_secondary: Vec<DualEntry>,
}

/// A validated single-metric submission, ready for the merge engine.
///
/// Produced by [`submit::ScoreRequest::validate`](crate::submit::ScoreRequest);
/// the merge engine assumes range-checked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub participant_id: String,
    pub display_name: Option<String>,
    pub metric: u64,
}

/// A validated dual-metric submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualSubmission {
    pub participant_id: String,
    pub display_name: Option<String>,
    pub primary_metric: u64,
    pub secondary_metric: u64,
}
