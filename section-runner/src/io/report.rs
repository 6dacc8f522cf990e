//! JSON report of a finished run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::PassReport;
use crate::looping::{LoopOutcome, LoopStop};
use crate::tree::SectionSnapshot;

/// Persisted summary of one test case's passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    /// Test case name (the root section).
    pub test: String,
    /// Why the driver stopped.
    pub stop: LoopStop,
    /// One entry per pass, in execution order.
    pub passes: Vec<PassReport>,
    /// Final state of the section tree.
    pub tree: SectionSnapshot,
}

impl From<&LoopOutcome> for RunReport {
    fn from(outcome: &LoopOutcome) -> Self {
        Self {
            test: outcome.test_name.clone(),
            stop: outcome.stop.clone(),
            passes: outcome.passes.clone(),
            tree: outcome.tree.clone(),
        }
    }
}

/// Atomically write the report to disk (temp file + rename).
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    debug!(
        path = %path.display(),
        test = %report.test,
        passes = report.passes.len(),
        "writing run report"
    );
    let mut buf = serde_json::to_string_pretty(report).context("serialize run report")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

/// Load a report written by [`write_report`].
pub fn load_report(path: &Path) -> Result<RunReport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read run report {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse run report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::SectionState;
    use crate::core::types::PassOutcome;

    fn sample_report() -> RunReport {
        RunReport {
            test: "case".to_string(),
            stop: LoopStop::Complete,
            passes: vec![PassReport {
                index: 1,
                leaf: Some("case/A".to_string()),
                outcome: PassOutcome::Completed,
            }],
            tree: SectionSnapshot {
                name: "case".to_string(),
                state: SectionState::TestedBranch,
                children: vec![SectionSnapshot {
                    name: "A".to_string(),
                    state: SectionState::TestedLeaf,
                    children: Vec::new(),
                }],
            },
        }
    }

    #[test]
    fn report_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("report.json");
        let report = sample_report();
        write_report(&path, &report).expect("write");
        assert_eq!(load_report(&path).expect("load"), report);
    }

    /// Guards the field names downstream tooling reads.
    #[test]
    fn report_json_shape_is_stable() {
        let value = serde_json::to_value(sample_report()).expect("serialize");
        assert_eq!(value["stop"]["reason"], "complete");
        assert_eq!(value["passes"][0]["outcome"], "completed");
        assert_eq!(value["passes"][0]["leaf"], "case/A");
        assert_eq!(value["tree"]["children"][0]["state"], "tested_leaf");
    }
}
