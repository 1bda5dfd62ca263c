//! The submission handlers end to end: validation, rank reporting,
//! dual-metric commits, and legacy stored shapes.

use podium_core::config::BoardConfig;
use podium_core::store::{MemoryStore, SnapshotStore, StoreError};
use podium_core::submit::{
    submit_dual, submit_score, submit_score_ranked, DualRequest, ScoreRequest, SubmitError,
    SubmitOutcome,
};
use serde_json::json;

const BOARD: &str = "boards/main";

fn request(id: &str, name: Option<&str>, metric: f64) -> ScoreRequest {
    ScoreRequest {
        participant_id: id.to_string(),
        display_name: name.map(str::to_string),
        metric,
        timestamp: None,
    }
}

#[tokio::test]
async fn invalid_submission_is_rejected_before_the_store_is_touched() {
    let store = MemoryStore::new();
    let config = BoardConfig::default();

    let result = submit_score(&store, BOARD, &request("", None, 10.0), &config).await;
    assert!(matches!(result, Err(SubmitError::Validation(_))));
    assert_eq!(store.read(BOARD).await.expect("read"), None);
}

#[tokio::test]
async fn first_submission_commits_a_single_entry_board() {
    let store = MemoryStore::new();
    let config = BoardConfig::default();

    let outcome = submit_score(&store, BOARD, &request("p1", Some("Alice"), 100.0), &config)
        .await
        .expect("submission");
    let SubmitOutcome::Committed(board) = outcome else {
        panic!("first submission must commit");
    };
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].participant_id, "p1");
    assert_eq!(board[0].display_name, "Alice");
    assert_eq!(board[0].metric, 100);
}

#[tokio::test]
async fn lower_score_reports_no_change_and_writes_nothing() {
    let store = MemoryStore::new();
    let config = BoardConfig::default();

    submit_score(&store, BOARD, &request("p1", None, 80.0), &config)
        .await
        .expect("seed");
    let before = store.read(BOARD).await.expect("read");

    let outcome = submit_score(&store, BOARD, &request("p1", None, 70.0), &config)
        .await
        .expect("submission");
    assert_eq!(outcome, SubmitOutcome::NoChange);
    assert_eq!(store.read(BOARD).await.expect("read"), before);
}

#[tokio::test]
async fn ranked_submission_reports_the_one_based_position() {
    let store = MemoryStore::new();
    let config = BoardConfig::default();

    submit_score(&store, BOARD, &request("leader", None, 100.0), &config)
        .await
        .expect("seed");
    submit_score(&store, BOARD, &request("tail", None, 10.0), &config)
        .await
        .expect("seed");

    let receipt = submit_score_ranked(&store, BOARD, &request("middle", None, 50.0), &config)
        .await
        .expect("submission");
    assert!(matches!(receipt.outcome, SubmitOutcome::Committed(_)));
    assert_eq!(receipt.rank, Some(2));
}

#[tokio::test]
async fn ranked_no_change_omits_the_rank() {
    let store = MemoryStore::new();
    let config = BoardConfig::default();

    submit_score(&store, BOARD, &request("p1", None, 80.0), &config)
        .await
        .expect("seed");
    let receipt = submit_score_ranked(&store, BOARD, &request("p1", None, 80.0), &config)
        .await
        .expect("submission");
    assert_eq!(receipt.outcome, SubmitOutcome::NoChange);
    assert_eq!(receipt.rank, None);
}

#[tokio::test]
async fn legacy_map_shaped_board_is_merged_and_committed_as_a_list() {
    let store = MemoryStore::new();
    let config = BoardConfig::default();

    store.seed(
        BOARD,
        json!({
            "p1": { "displayName": "Alice", "metric": 80, "submittedAt": 1 },
            "p2": { "displayName": "Bob", "metric": 60, "submittedAt": 2 },
        }),
    );

    let outcome = submit_score(&store, BOARD, &request("p3", Some("Carol"), 70.0), &config)
        .await
        .expect("submission");
    let SubmitOutcome::Committed(board) = outcome else {
        panic!("new participant must commit");
    };
    assert_eq!(board.len(), 3);
    assert_eq!(board[0].participant_id, "p1");
    assert_eq!(board[1].participant_id, "p3");
    assert_eq!(board[2].participant_id, "p2");

    // The committed value is the canonical array shape.
    let stored = store.read(BOARD).await.expect("read").expect("present");
    assert!(stored.is_array());
}

#[tokio::test]
async fn dual_submission_improving_one_axis_commits_the_pair() {
    let store = MemoryStore::new();
    let config = BoardConfig::default();

    let seed = DualRequest {
        participant_id: "p1".to_string(),
        display_name: Some("Alice".to_string()),
        primary_metric: 10.0,
        secondary_metric: 3.0,
    };
    submit_dual(&store, BOARD, &seed, &config).await.expect("seed");

    // Improves the secondary axis only.
    let update = DualRequest {
        secondary_metric: 9.0,
        ..seed.clone()
    };
    let outcome = submit_dual(&store, BOARD, &update, &config)
        .await
        .expect("submission");
    let SubmitOutcome::Committed(pair) = outcome else {
        panic!("secondary-axis improvement must commit the pair");
    };
    assert_eq!(pair.by_primary[0].primary_metric, 10);
    assert_eq!(pair.by_secondary[0].secondary_metric, 9);
}

#[tokio::test]
async fn store_unavailability_propagates_as_a_retryable_error() {
    // A zero retry budget makes the first injected conflict fatal.
    let store = MemoryStore::with_retry_budget(0);
    let config = BoardConfig::default();
    store.seed(BOARD, json!([]));

    let conflicting: Result<_, StoreError> = store
        .transact(BOARD, &mut |_| {
            store.seed(BOARD, json!([{ "participantId": "racer", "metric": 1 }]));
            podium_core::merge::MergeOutcome::Changed(json!([]))
        })
        .await;
    assert!(matches!(conflicting, Err(StoreError::Unavailable(_))));

    // The same failure surfaces from the submission handler as SubmitError::Store.
    let store = MemoryStore::with_retry_budget(0);
    store.seed(BOARD, json!([]));
    let blocked = BlockedStore { inner: store };
    let result = submit_score(&blocked, BOARD, &request("p1", None, 10.0), &config).await;
    assert!(matches!(result, Err(SubmitError::Store(StoreError::Unavailable(_)))));
}

/// Store wrapper that loses every compare-and-swap race.
struct BlockedStore {
    inner: MemoryStore,
}

#[async_trait::async_trait]
impl podium_core::store::SnapshotStore for BlockedStore {
    async fn transact(
        &self,
        key: &str,
        apply: &mut podium_core::store::MergeFn<'_>,
    ) -> Result<podium_core::store::TransactOutcome, StoreError> {
        let mut bump = 0_u64;
        self.inner
            .transact(key, &mut |current| {
                bump += 1;
                self.inner.seed(key, json!(bump));
                apply(current)
            })
            .await
    }

    async fn read(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        self.inner.read(key).await
    }
}
