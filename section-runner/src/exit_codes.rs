//! Stable exit codes for CLI commands.

/// Every section was explored and no pass failed.
pub const OK: i32 = 0;
/// Command failed due to an invalid script/config or other errors.
pub const INVALID: i32 = 1;
/// Every section was explored but at least one pass failed.
pub const FAILED: i32 = 2;
/// A section kept aborting and was given up on.
pub const STUCK: i32 = 3;
/// The pass limit was reached before exploration finished.
pub const LIMIT: i32 = 4;
