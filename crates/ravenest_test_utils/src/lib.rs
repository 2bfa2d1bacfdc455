//! # Ravenest Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Valid content fixtures on disk and in memory
//! - Images tree builder
//! - Idempotence test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
