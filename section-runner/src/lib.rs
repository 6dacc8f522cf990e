//! Section tracking for re-entrant test routines.
//!
//! A test routine declares named, arbitrarily nested sections inline. The
//! driver re-invokes the whole routine once per leaf path; a persistent
//! section tree remembers which branches are done so each pass skips them and
//! executes only the path to the next unexplored leaf.
//!
//! - **[`core`]**: Pure, deterministic logic (section states, the Enter/Leave
//!   cursor, selection, invariants). No I/O, fully testable in isolation.
//! - **[`tree`]**: The arena-backed section tree.
//! - **[`io`]**: Configuration and report files.
//!
//! [`pass`] and [`looping`] coordinate core logic into the retry driver;
//! [`script`] describes routines declaratively for the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod pass;
pub mod script;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tree;
