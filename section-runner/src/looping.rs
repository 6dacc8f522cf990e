//! Multi-pass driver: re-invokes a test routine until its section tree is explored.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::invariants::validate_invariants;
use crate::core::path::section_path;
use crate::core::selector::leftmost_untested;
use crate::core::types::{PassOutcome, PassReport};
use crate::io::config::RunConfig;
use crate::pass::{Pass, PassSummary};
use crate::tree::{SectionId, SectionSnapshot, SectionTree};

/// Reason why `run_loop` stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LoopStop {
    /// No section is left to explore.
    Complete,
    /// The same section aborted `attempts` times in a row without progress.
    Stuck {
        path: String,
        attempts: u32,
        max_attempts: u32,
    },
    /// The run reached the configured `max_passes`.
    MaxPassesExceeded { passes: u32, max_passes: u32 },
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub test_name: String,
    pub passes: Vec<PassReport>,
    pub stop: LoopStop,
    pub tree: SectionSnapshot,
}

impl LoopOutcome {
    pub fn passes_executed(&self) -> u32 {
        self.passes.len() as u32
    }

    pub fn failed_passes(&self) -> usize {
        self.passes.iter().filter(|p| p.outcome.is_failed()).count()
    }
}

/// Consecutive aborts of the same section with no leaf completed in between.
#[derive(Debug, Default)]
struct AbortStreak {
    section: Option<SectionId>,
    attempts: u32,
}

impl AbortStreak {
    fn record(&mut self, summary: &PassSummary) -> u32 {
        if summary.tested_leaf.is_some() || summary.aborted_in.is_none() {
            *self = Self::default();
            return 0;
        }
        if self.section == summary.aborted_in {
            self.attempts += 1;
        } else {
            self.section = summary.aborted_in;
            self.attempts = 1;
        }
        self.attempts
    }
}

/// Invoke `routine` once per pass until the tree has no untested sections,
/// a section is stuck, or `config.max_passes` is reached.
///
/// At least one pass always runs. A pass aborts when the routine returns an
/// error or panics; sections it left before aborting keep their progress.
/// Invariant violations in the tree stop the loop with an error.
pub fn run_loop<R, F>(
    test_name: &str,
    config: &RunConfig,
    mut routine: R,
    mut on_pass: F,
) -> Result<LoopOutcome>
where
    R: FnMut(&mut Pass<'_>) -> Result<()>,
    F: FnMut(&PassReport),
{
    config.validate()?;
    let mut tree = SectionTree::new(test_name);
    let mut passes: Vec<PassReport> = Vec::new();
    let mut streak = AbortStreak::default();

    loop {
        let index = passes.len() as u32;
        if index > 0 && !tree.has_untested_work(tree.root()) {
            info!(test = test_name, passes = index, "all sections explored");
            return Ok(finish(test_name, passes, LoopStop::Complete, &tree));
        }
        if index >= config.max_passes {
            warn!(
                test = test_name,
                max_passes = config.max_passes,
                "pass limit reached"
            );
            let stop = LoopStop::MaxPassesExceeded {
                passes: index,
                max_passes: config.max_passes,
            };
            return Ok(finish(test_name, passes, stop, &tree));
        }

        if let Some(next) = leftmost_untested(&tree, tree.root()) {
            debug!(
                test = test_name,
                pass = index + 1,
                next = %path_label(&tree, next),
                "starting pass"
            );
        }

        let (summary, outcome) = run_pass(&mut tree, index + 1, &mut routine);
        let errors = validate_invariants(&tree);
        if !errors.is_empty() {
            return Err(anyhow!(
                "section tree invariants failed after pass {}: {}",
                index + 1,
                errors.join("; ")
            ));
        }

        let report = PassReport {
            index: index + 1,
            leaf: summary.tested_leaf.map(|id| path_label(&tree, id)),
            outcome,
        };
        on_pass(&report);
        passes.push(report);

        let attempts = streak.record(&summary);
        if attempts >= config.max_attempts
            && let Some(section) = summary.aborted_in
        {
            let path = path_label(&tree, section);
            warn!(test = test_name, section = %path, attempts, "section is stuck");
            let stop = LoopStop::Stuck {
                path,
                attempts,
                max_attempts: config.max_attempts,
            };
            return Ok(finish(test_name, passes, stop, &tree));
        }
    }
}

fn run_pass<R>(
    tree: &mut SectionTree,
    index: u32,
    routine: &mut R,
) -> (PassSummary, PassOutcome)
where
    R: FnMut(&mut Pass<'_>) -> Result<()>,
{
    let mut pass = Pass::new(tree, index);
    let result = panic::catch_unwind(AssertUnwindSafe(|| routine(&mut pass)));
    let message = match result {
        Ok(Ok(())) => {
            debug!(pass = index, "pass completed");
            return (pass.complete(), PassOutcome::Completed);
        }
        Ok(Err(err)) => format!("{err:#}"),
        Err(payload) => panic_message(payload.as_ref()),
    };

    let section = pass.current_path();
    info!(pass = index, section = %section, error = %message, "pass aborted");
    (pass.abort(), PassOutcome::Failed { section, message })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "panic with non-string payload".to_string()
}

fn path_label(tree: &SectionTree, id: SectionId) -> String {
    section_path(tree, id).unwrap_or_else(|| format!("#{}", id.index()))
}

fn finish(
    test_name: &str,
    passes: Vec<PassReport>,
    stop: LoopStop,
    tree: &SectionTree,
) -> LoopOutcome {
    LoopOutcome {
        test_name: test_name.to_string(),
        passes,
        stop,
        tree: tree.snapshot(),
    }
}
