//! Submission intake and handler glue.
//!
//! This is the seam between an external transport (out of scope here) and
//! the core: a raw request is validated, the merge engine runs inside a
//! store transaction with a fresh timestamp per invocation, and the caller
//! gets back either the committed board, a no-change indication, or — in the
//! explicit-rank variant — a best-effort 1-based rank.
//!
//! Validation happens **before** the core runs; the merge engine never
//! raises domain errors for well-formed input.

use crate::config::BoardConfig;
use crate::merge::{merge_board, merge_pair};
use crate::rank::estimate_rank;
use crate::snapshot::normalize;
use crate::store::{SnapshotStore, StoreError, TransactOutcome};
use crate::types::{now_ms, BoardPair, DualSubmission, Entry, ScoreSubmission};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Reasons a submission is rejected before the merge engine runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("participantId must be a non-empty string")]
    EmptyParticipantId,

    #[error("metric must be a finite, non-negative number")]
    InvalidMetric,
}

/// Errors surfaced by the submission handlers.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    /// Preserves the concrete `StoreError` so callers can report the failure
    /// as retryable.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raw single-metric submission as received at the intake boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub participant_id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    pub metric: f64,

    /// Client-reported timestamp, carried through intake for variants that
    /// require one. Never used for eviction tie-breaking, which is always
    /// server-captured.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl ScoreRequest {
    /// Validates shape and range, flooring the metric to an integer.
    pub fn validate(&self) -> Result<ScoreSubmission, ValidationError> {
        require_participant_id(&self.participant_id)?;
        Ok(ScoreSubmission {
            participant_id: self.participant_id.clone(),
            display_name: self.display_name.clone(),
            metric: floor_metric(self.metric)?,
        })
    }
}

/// Raw dual-metric submission: one record ranked on two axes independently.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualRequest {
    pub participant_id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    pub primary_metric: f64,

    pub secondary_metric: f64,
}

impl DualRequest {
    /// Validates shape and range, flooring both metrics to integers.
    pub fn validate(&self) -> Result<DualSubmission, ValidationError> {
        require_participant_id(&self.participant_id)?;
        Ok(DualSubmission {
            participant_id: self.participant_id.clone(),
            display_name: self.display_name.clone(),
            primary_metric: floor_metric(self.primary_metric)?,
            secondary_metric: floor_metric(self.secondary_metric)?,
        })
    }
}

fn require_participant_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyParticipantId);
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_metric(metric: f64) -> Result<u64, ValidationError> {
    if !metric.is_finite() || metric < 0.0 {
        return Err(ValidationError::InvalidMetric);
    }
    Ok(metric.floor() as u64)
}

/// Outcome reported to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    /// The submission qualified; this is the committed snapshot.
    Committed(T),
    /// The submission did not qualify for admission or update. Not a
    /// failure: the caller reports success without a rank change.
    NoChange,
}

/// Receipt for the explicit-rank variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedReceipt {
    pub outcome: SubmitOutcome<Vec<Entry>>,
    /// 1-based position from a post-commit, non-transactional read. `None`
    /// when the participant was not found — a narrow race with a subsequent
    /// eviction, treated as non-fatal.
    pub rank: Option<usize>,
}

/// Submits a single-metric score through the store's optimistic transaction.
pub async fn submit_score<S>(
    store: &S,
    board_key: &str,
    request: &ScoreRequest,
    config: &BoardConfig,
) -> Result<SubmitOutcome<Vec<Entry>>, SubmitError>
where
    S: SnapshotStore + ?Sized,
{
    let submission = request.validate()?;
    let outcome = store
        .transact(board_key, &mut |current| {
            // Timestamp captured fresh per invocation, including retries.
            merge_board(current, &submission, now_ms(), config).map(|board| {
                serde_json::to_value(board).expect("leaderboard serialization cannot fail")
            })
        })
        .await?;

    match outcome {
        TransactOutcome::Committed(value) => {
            debug!(board_key, participant = %submission.participant_id, "leaderboard updated");
            let board: Vec<Entry> =
                serde_json::from_value(value).expect("committed leaderboard value round-trips");
            Ok(SubmitOutcome::Committed(board))
        }
        TransactOutcome::NoChange => {
            debug!(board_key, participant = %submission.participant_id, "submission below the bar");
            Ok(SubmitOutcome::NoChange)
        }
    }
}

/// Single-metric variant that also reports the submitter's rank.
///
/// The rank comes from a read performed **after** the writing transaction
/// commits; it is immediate feedback for the submitter, not a leaderboard
/// consistency mechanism, and may already be stale relative to concurrent
/// writers.
pub async fn submit_score_ranked<S>(
    store: &S,
    board_key: &str,
    request: &ScoreRequest,
    config: &BoardConfig,
) -> Result<RankedReceipt, SubmitError>
where
    S: SnapshotStore + ?Sized,
{
    let outcome = submit_score(store, board_key, request, config).await?;
    let rank = match &outcome {
        SubmitOutcome::Committed(_) => {
            let entries = normalize(store.read(board_key).await?.as_ref());
            estimate_rank(&entries, &request.participant_id)
        }
        SubmitOutcome::NoChange => None,
    };
    Ok(RankedReceipt { outcome, rank })
}

/// Submits a dual-metric record; each axis is merged independently and the
/// pair commits as a single unit when either list changes.
pub async fn submit_dual<S>(
    store: &S,
    board_key: &str,
    request: &DualRequest,
    config: &BoardConfig,
) -> Result<SubmitOutcome<BoardPair>, SubmitError>
where
    S: SnapshotStore + ?Sized,
{
    let submission = request.validate()?;
    let outcome = store
        .transact(board_key, &mut |current| {
            merge_pair(current, &submission, now_ms(), config).map(|pair| {
                serde_json::to_value(pair).expect("leaderboard pair serialization cannot fail")
            })
        })
        .await?;

    match outcome {
        TransactOutcome::Committed(value) => {
            debug!(board_key, participant = %submission.participant_id, "leaderboard pair updated");
            let pair: BoardPair =
                serde_json::from_value(value).expect("committed pair value round-trips");
            Ok(SubmitOutcome::Committed(pair))
        }
        TransactOutcome::NoChange => Ok(SubmitOutcome::NoChange),
    }
}
