//! Shared deterministic types for the section core.
//!
//! These types define stable contracts between the cursor, the pass context
//! and the driver. They carry no I/O and remain deterministic across runs.

use serde::{Deserialize, Serialize};

use crate::tree::SectionId;

/// Decision returned when a routine crosses a section boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Run the section body; the caller must pair this with one `leave`.
    Execute(SectionId),
    /// Skip the body entirely for this pass.
    Skip,
}

impl Admission {
    pub fn should_execute(self) -> bool {
        matches!(self, Admission::Execute(_))
    }
}

/// How a single pass of the routine ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PassOutcome {
    /// The routine returned normally.
    Completed,
    /// The routine returned an error or panicked inside `section`.
    Failed { section: String, message: String },
}

impl PassOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PassOutcome::Failed { .. })
    }
}

/// Per-pass record produced by the driver.
///
/// `leaf` is the path of the section completed as a leaf in this pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub index: u32,
    pub leaf: Option<String>,
    #[serde(flatten)]
    pub outcome: PassOutcome,
}
