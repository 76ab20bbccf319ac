//! # Player Test Utilities
//!
//! Shared testing utilities for the player-state crates:
//! - Canned data stores (sciences, ranks, upgrades, templates)
//! - Recording collaborator hooks
//! - A harness bundling everything a [`player_core::player::PlayerContext`]
//!   needs
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod recording;

pub use fixtures::TestHarness;
pub use recording::{RecordingScript, RecordingWorld};

/// Re-export proptest for convenience.
pub use proptest;

/// Initialize tracing output for a test run.
///
/// Safe to call from multiple tests; only the first call installs a
/// subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
