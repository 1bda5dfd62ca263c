//! Merge Engine: admission, in-place update, and eviction for bounded ranked
//! lists.
//!
//! # Algorithm
//!
//! Given the canonical current list and one submission:
//!
//! 1. An existing participant is updated in place only on a **strict**
//!    improvement of the ranked metric (name and timestamp are replaced along
//!    with it); anything else is [`MergeOutcome::NoChange`].
//! 2. A new participant is appended while the list has spare capacity.
//! 3. At capacity, a new participant is admitted only if their metric is
//!    strictly above the current minimum. The eviction victim is chosen among
//!    the minimum-metric entries as the one with the **largest**
//!    `submitted_at`: the most recently admitted or updated loser goes first,
//!    so long-standing low scorers are not bumped by a near-simultaneous
//!    marginal challenger.
//! 4. The list is re-sorted descending by metric (stable, so tied entries
//!    keep their relative order) before being returned.
//!
//! # Purity
//!
//! Every function here is a pure function of `(current, submission, now_ms)`.
//! The surrounding store transaction may invoke it any number of times with
//! progressively fresher values; each invocation re-derives the whole
//! decision and nothing is remembered across invocations.

use crate::config::BoardConfig;
use crate::snapshot::{normalize, normalize_pair};
use crate::types::{
    clamp_name, BoardPair, DualEntry, DualSubmission, Entry, Ranked, ScoreSubmission, ANONYMOUS,
};
use serde_json::Value;
use tracing::debug;

/// Result of a merge decision.
///
/// `NoChange` aborts the surrounding transaction with no write. This is
/// deliberately distinct from returning an unchanged value: the latter would
/// still commit identical content and contend with concurrent writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome<T> {
    /// The submission qualified; commit this as the next snapshot.
    Changed(T),
    /// The submission did not qualify for admission or update.
    NoChange,
}

impl<T> MergeOutcome<T> {
    /// Returns the changed value, or `None` for `NoChange`.
    #[must_use]
    pub fn into_changed(self) -> Option<T> {
        match self {
            Self::Changed(value) => Some(value),
            Self::NoChange => None,
        }
    }

    #[must_use]
    pub const fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChange)
    }

    /// Maps the changed value, preserving `NoChange`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MergeOutcome<U> {
        match self {
            Self::Changed(value) => MergeOutcome::Changed(f(value)),
            Self::NoChange => MergeOutcome::NoChange,
        }
    }
}

/// The bounded-ranked-list algorithm, parameterized by a metric extractor.
///
/// One instance serves the single-metric board and each half of the
/// dual-metric pair; the extractor decides which field ranks the list.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRankedList {
    capacity: usize,
}

impl BoundedRankedList {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Applies the admission/update/eviction policy for one candidate entry.
    ///
    /// The candidate's metric (as seen by `metric`) and `submitted_at` must
    /// already be final; this function only decides whether and where the
    /// candidate lands.
    pub fn merge<E, F>(&self, mut list: Vec<E>, candidate: E, metric: F) -> MergeOutcome<Vec<E>>
    where
        E: Ranked,
        F: Fn(&E) -> u64,
    {
        let submitted = metric(&candidate);

        if let Some(pos) = list
            .iter()
            .position(|e| e.participant_id() == candidate.participant_id())
        {
            // Existing participant: strict improvement replaces the entry in
            // place, everything else leaves the stored metric untouched.
            if submitted > metric(&list[pos]) {
                list[pos] = candidate;
            } else {
                return MergeOutcome::NoChange;
            }
        } else if list.len() < self.capacity {
            list.push(candidate);
        } else {
            let Some(min) = list.iter().map(&metric).min() else {
                // Zero-capacity list: nothing is ever admissible.
                return MergeOutcome::NoChange;
            };
            if submitted <= min {
                return MergeOutcome::NoChange;
            }
            if let Some(victim) = Self::eviction_victim(&list, &metric, min) {
                debug!(
                    evicted = list[victim].participant_id(),
                    admitted = candidate.participant_id(),
                    "capacity eviction"
                );
                list.remove(victim);
            }
            list.push(candidate);
        }

        list.sort_by(|a, b| metric(b).cmp(&metric(a)));
        MergeOutcome::Changed(list)
    }

    /// Among the minimum-metric entries, picks the most recently submitted.
    ///
    /// Ties on `submitted_at` resolve to the earliest list position, matching
    /// a left-to-right reduce that keeps the incumbent on equality.
    fn eviction_victim<E, F>(list: &[E], metric: &F, min: u64) -> Option<usize>
    where
        E: Ranked,
        F: Fn(&E) -> u64,
    {
        let mut victim: Option<(usize, i64)> = None;
        for (idx, entry) in list.iter().enumerate() {
            if metric(entry) != min {
                continue;
            }
            match victim {
                Some((_, newest)) if entry.submitted_at() <= newest => {}
                _ => victim = Some((idx, entry.submitted_at())),
            }
        }
        victim.map(|(idx, _)| idx)
    }
}

/// Resolves the display name for a candidate entry.
///
/// A submitted name wins (truncated to the configured length); otherwise the
/// name already stored for this participant in this list is retained, falling
/// back to the anonymous placeholder for first-time participants.
fn resolve_name<E: Ranked>(
    list: &[E],
    participant_id: &str,
    submitted: Option<&str>,
    max_name_len: usize,
) -> String {
    match submitted {
        Some(name) => clamp_name(name, max_name_len),
        None => list
            .iter()
            .find(|e| e.participant_id() == participant_id)
            .map(|e| e.display_name().to_string())
            .unwrap_or_else(|| ANONYMOUS.to_string()),
    }
}

/// Single-metric merge: computes the next leaderboard state or `NoChange`.
///
/// `current` is whatever the store handed back (any raw shape, or absent);
/// `now_ms` is the timestamp recorded on the candidate entry if it lands.
#[must_use]
pub fn merge_board(
    current: Option<&Value>,
    submission: &ScoreSubmission,
    now_ms: i64,
    config: &BoardConfig,
) -> MergeOutcome<Vec<Entry>> {
    let list = normalize(current);
    let display_name = resolve_name(
        &list,
        &submission.participant_id,
        submission.display_name.as_deref(),
        config.max_name_len,
    );
    let candidate = Entry {
        participant_id: submission.participant_id.clone(),
        display_name,
        metric: submission.metric,
        submitted_at: now_ms,
    };
    BoundedRankedList::new(config.capacity).merge(list, candidate, |e| e.metric)
}

/// Dual-metric merge: applies the single-board policy independently to each
/// half of the pair, sharing one submission timestamp.
///
/// The two sub-decisions never gate each other: failing to improve on one
/// axis cannot block or roll back an accepted improvement on the other. The
/// pair-level result is `NoChange` only when **neither** list changes;
/// otherwise both lists (one possibly unmodified) are returned together,
/// since the store commits the pair as a single unit.
#[must_use]
pub fn merge_pair(
    current: Option<&Value>,
    submission: &DualSubmission,
    now_ms: i64,
    config: &BoardConfig,
) -> MergeOutcome<BoardPair> {
    let (by_primary, by_secondary) = normalize_pair(current);
    let ranked = BoundedRankedList::new(config.capacity);

    let candidate = |list: &[DualEntry]| DualEntry {
        participant_id: submission.participant_id.clone(),
        display_name: resolve_name(
            list,
            &submission.participant_id,
            submission.display_name.as_deref(),
            config.max_name_len,
        ),
        primary_metric: submission.primary_metric,
        secondary_metric: submission.secondary_metric,
        submitted_at: now_ms,
    };

    let primary_candidate = candidate(&by_primary);
    let secondary_candidate = candidate(&by_secondary);

    let primary = ranked.merge(by_primary.clone(), primary_candidate, |e| e.primary_metric);
    let secondary = ranked.merge(by_secondary.clone(), secondary_candidate, |e| {
        e.secondary_metric
    });

    if primary.is_no_change() && secondary.is_no_change() {
        return MergeOutcome::NoChange;
    }
    MergeOutcome::Changed(BoardPair {
        by_primary: primary.into_changed().unwrap_or(by_primary),
        by_secondary: secondary.into_changed().unwrap_or(by_secondary),
    })
}
