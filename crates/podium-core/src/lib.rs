//! # Podium Core
//!
//! Core library for Podium, a bounded ranked-leaderboard engine designed to
//! run inside optimistic compare-and-retry store transactions.
//!
//! This crate provides the foundational components for:
//!
//! - **[`snapshot`]**: Normalization of store-returned values of unknown shape
//!   (absent, keyed map, or ordered list) into one canonical entry list.
//!
//! - **[`merge`]**: The merge engine — a pure admission/update/eviction
//!   function computing the next leaderboard state from the current state and
//!   one submission, for both the single-metric and dual-metric variants.
//!
//! - **[`rank`]**: Best-effort rank estimation from a post-commit read.
//!
//! - **[`store`]**: The optimistic transaction boundary (`SnapshotStore`) and
//!   an in-process compare-and-swap implementation (`MemoryStore`).
//!
//! - **[`submit`]**: Submission intake (validation) and the handler glue that
//!   runs the merge engine inside a store transaction.
//!
//! - **[`config`]**: Layered configuration with compiled defaults, an optional
//!   TOML file, and environment overrides.
//!
//! ## Submission Flow
//!
//! ```text
//! Validated Submission
//!         │
//!         ▼
//! ┌───────────────┐   latest committed value (fresh on every retry)
//! │ store.transact│ ◄─────────────────────────────┐
//! └───────┬───────┘                               │
//!         │ invokes                               │ conflict
//!         ▼                                       │
//! ┌───────────────┐    ┌───────────────┐   ┌──────┴───────┐
//! │   Normalizer  │ ─► │  Merge Engine │ ─►│ CAS commit   │
//! │ (any shape →  │    │ admit/update/ │   │ (version     │
//! │  entry list)  │    │ evict/re-sort │   │  unchanged?) │
//! └───────────────┘    └───────────────┘   └──────┬───────┘
//!                            │ NoChange           │ committed
//!                            ▼                    ▼
//!                      abort, no write      new snapshot
//! ```
//!
//! ## Concurrency Contract
//!
//! The merge engine is a pure function of `(current value, submission, now)`
//! with no observable side effects besides its return value; the one accepted
//! exception is wall-clock capture for the eviction tie-break timestamp. The
//! store re-invokes it with the newer value after a conflicting concurrent
//! commit, so it must re-derive every decision from the value it is handed and
//! must never remember state across invocations.

pub mod config;
pub mod merge;
pub mod rank;
pub mod snapshot;
pub mod store;
pub mod submit;
pub mod types;
