//! Best-effort rank estimation from a post-commit read.
//!
//! Used by the explicit-rank submission variant: after the writing
//! transaction commits, the board is re-read **outside** any transaction and
//! the submitter's 1-based position is reported as immediate feedback. The
//! read may observe a value older or newer than the just-committed write;
//! this is an accepted weak-consistency read, never a consistency mechanism.

use crate::types::Entry;

/// Returns the 1-based position of `participant_id` when ranked descending
/// by metric, or `None` if the participant is absent.
///
/// Absence is non-fatal: a just-written participant can disappear in the
/// narrow race with a subsequent eviction, and callers omit the rank rather
/// than fail. The sort is stable, so tied entries keep their stored order
/// and the first matching entry decides the rank.
#[must_use]
pub fn estimate_rank(entries: &[Entry], participant_id: &str) -> Option<usize> {
    let mut ranked: Vec<&Entry> = entries.iter().collect();
    ranked.sort_by(|a, b| b.metric.cmp(&a.metric));
    ranked
        .iter()
        .position(|e| e.participant_id == participant_id)
        .map(|pos| pos + 1)
}
