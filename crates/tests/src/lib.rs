//! Integration tests for the Podium leaderboard engine.
//!
//! This crate contains the test modules:
//!
//! - `invariant_tests`: leaderboard invariants (cap, uniqueness, sortedness,
//!   monotonic improvement) over full submission sequences through the store
//! - `concurrency_tests`: concurrent submissions through the optimistic
//!   transaction loop
//! - `submit_tests`: the submission handlers end to end — validation, rank
//!   reporting, dual-metric commits, legacy stored shapes
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```



#[cfg(test)]
mod submit_tests;
