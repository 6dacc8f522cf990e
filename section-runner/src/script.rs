//! Declarative test routines described in TOML.
//!
//! A script models a routine's control flow: nested sections, sections
//! declared repeatedly in one scope, and bodies that abort a number of times
//! before succeeding.
//!
//! ```toml
//! name = "vector"
//!
//! [[section]]
//! name = "resize"
//!
//!   [[section.section]]
//!   name = "bigger"
//!
//!   [[section.section]]
//!   name = "smaller"
//!   fail = "capacity shrank"
//!   fail_times = 1
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::pass::Pass;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Test case name; becomes the root section.
    pub name: String,
    #[serde(default, rename = "section")]
    pub sections: Vec<ScriptSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSection {
    pub name: String,
    /// Number of consecutive declarations of this section in its scope.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Abort message raised on entry to the body.
    #[serde(default)]
    pub fail: Option<String>,
    /// How many executions abort before the body succeeds. Zero aborts on
    /// every execution. Defaults to 1 when `fail` is set.
    #[serde(default)]
    pub fail_times: Option<u32>,
    #[serde(default, rename = "section")]
    pub sections: Vec<ScriptSection>,
}

fn default_repeat() -> u32 {
    1
}

impl Script {
    pub fn parse(contents: &str) -> Result<Self> {
        let script: Script = toml::from_str(contents).context("parse section script")?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("load script {}", path.display()))
    }

    /// Reject names the tree could not address by path.
    pub fn validate(&self) -> Result<()> {
        check_name(&self.name)?;
        let mut stack: Vec<&ScriptSection> = self.sections.iter().collect();
        while let Some(section) = stack.pop() {
            check_name(&section.name)?;
            if section.repeat == 0 {
                return Err(anyhow!("section '{}': repeat must be > 0", section.name));
            }
            if section.fail_times.is_some() && section.fail.is_none() {
                return Err(anyhow!(
                    "section '{}': fail_times requires fail",
                    section.name
                ));
            }
            stack.extend(section.sections.iter());
        }
        Ok(())
    }

    /// Leaf paths in the order the driver explores them.
    ///
    /// Sections sharing a name in one scope resolve to the same node. The
    /// first declaration settles that node, so later declarations of the
    /// name contribute nothing.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        collect_leaves(&self.name, &self.sections, &mut leaves);
        leaves
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("section names must not be empty");
    }
    if name.contains('/') {
        bail!("section name '{}' must not contain '/'", name);
    }
    Ok(())
}

fn collect_leaves(prefix: &str, sections: &[ScriptSection], leaves: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for section in sections {
        if !seen.insert(section.name.as_str()) {
            continue;
        }
        let path = format!("{}/{}", prefix, section.name);
        if section.sections.is_empty() {
            leaves.push(path);
        } else {
            collect_leaves(&path, &section.sections, leaves);
        }
    }
}

/// Routine that replays a [`Script`] through a [`Pass`].
///
/// Failure budgets are tracked per section path across passes.
pub struct ScriptRoutine<'s> {
    script: &'s Script,
    executions: HashMap<String, u32>,
}

impl<'s> ScriptRoutine<'s> {
    pub fn new(script: &'s Script) -> Self {
        Self {
            script,
            executions: HashMap::new(),
        }
    }

    /// How many times the body at `path` has started executing.
    pub fn executions(&self, path: &str) -> u32 {
        self.executions.get(path).copied().unwrap_or(0)
    }

    pub fn run(&mut self, pass: &mut Pass<'_>) -> Result<()> {
        let script = self.script;
        run_sections(pass, &script.sections, &mut self.executions)
    }
}

fn run_sections(
    pass: &mut Pass<'_>,
    sections: &[ScriptSection],
    executions: &mut HashMap<String, u32>,
) -> Result<()> {
    for section in sections {
        for _ in 0..section.repeat {
            pass.section(&section.name, |p| {
                let path = p.current_path();
                let count = executions.entry(path.clone()).or_insert(0);
                *count += 1;
                if let Some(message) = &section.fail {
                    let limit = section.fail_times.unwrap_or(1);
                    if limit == 0 || *count <= limit {
                        bail!("{}: {}", path, message);
                    }
                }
                run_sections(p, &section.sections, executions)
            })?;
        }
    }
    Ok(())
}
