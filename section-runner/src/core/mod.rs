//! Deterministic, pure logic for section tracking.
//!
//! Core modules are free of I/O side effects and logging. They operate on the
//! in-memory section tree and return deterministic outputs suitable for tests.

pub mod cursor;
pub mod invariants;
pub mod path;
pub mod selector;
pub mod state;
pub mod types;
