//! Section explorer CLI.
//!
//! Replays a section script (TOML) through the multi-pass driver, one pass per
//! leaf path, and reports how exploration ended.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use section_runner::core::types::{PassOutcome, PassReport};
use section_runner::exit_codes;
use section_runner::io::config::load_config;
use section_runner::io::report::{RunReport, write_report};
use section_runner::logging;
use section_runner::looping::{LoopOutcome, LoopStop, run_loop};
use section_runner::script::{Script, ScriptRoutine};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "section-runner",
    version,
    about = "Explore every leaf path of a sectioned test routine"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the script pass by pass until every section is explored.
    Explore {
        /// Section script (TOML).
        script: PathBuf,
        /// Driver configuration (TOML). Defaults apply when missing.
        #[arg(short, long, default_value = "section-runner.toml")]
        config: PathBuf,
        /// Write a JSON run report to this path.
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Print the leaf paths of the script in exploration order.
    Leaves {
        /// Section script (TOML).
        script: PathBuf,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Explore {
            script,
            config,
            report,
        } => cmd_explore(&script, &config, report.as_deref()),
        Command::Leaves { script } => cmd_leaves(&script),
    }
}

fn cmd_explore(
    script_path: &Path,
    config_path: &Path,
    report_path: Option<&Path>,
) -> Result<i32> {
    let script = Script::load(script_path)?;
    let config = load_config(config_path).context("load driver config")?;
    info!(test = %script.name, max_passes = config.max_passes, "exploring script");

    let mut routine = ScriptRoutine::new(&script);
    let outcome = run_loop(
        &script.name,
        &config,
        |pass| routine.run(pass),
        |report| println!("{}", render_pass(report)),
    )?;
    println!("{}", render_stop(&outcome));

    if let Some(path) = report_path {
        write_report(path, &RunReport::from(&outcome))?;
    }
    Ok(exit_code(&outcome))
}

fn cmd_leaves(script_path: &Path) -> Result<i32> {
    let script = Script::load(script_path)?;
    for leaf in script.leaf_paths() {
        println!("{}", leaf);
    }
    Ok(exit_codes::OK)
}

fn render_pass(report: &PassReport) -> String {
    let leaf = report.leaf.as_deref().unwrap_or("-");
    match &report.outcome {
        PassOutcome::Completed => format!("pass {}: ok {}", report.index, leaf),
        PassOutcome::Failed { section, message } => format!(
            "pass {}: FAILED in {} ({}) {}",
            report.index, section, message, leaf
        ),
    }
}

fn render_stop(outcome: &LoopOutcome) -> String {
    match &outcome.stop {
        LoopStop::Complete => format!(
            "{}: explored in {} passes ({} failed)",
            outcome.test_name,
            outcome.passes_executed(),
            outcome.failed_passes()
        ),
        LoopStop::Stuck {
            path,
            attempts,
            max_attempts,
        } => format!(
            "{}: stuck in {} after {}/{} attempts",
            outcome.test_name, path, attempts, max_attempts
        ),
        LoopStop::MaxPassesExceeded { passes, max_passes } => format!(
            "{}: stopped after {} passes (max_passes = {})",
            outcome.test_name, passes, max_passes
        ),
    }
}

fn exit_code(outcome: &LoopOutcome) -> i32 {
    match outcome.stop {
        LoopStop::Complete if outcome.failed_passes() == 0 => exit_codes::OK,
        LoopStop::Complete => exit_codes::FAILED,
        LoopStop::Stuck { .. } => exit_codes::STUCK,
        LoopStop::MaxPassesExceeded { .. } => exit_codes::LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_explore_defaults() {
        let cli = Cli::parse_from(["section-runner", "explore", "case.toml"]);
        match cli.command {
            Command::Explore {
                script,
                config,
                report,
            } => {
                assert_eq!(script, PathBuf::from("case.toml"));
                assert_eq!(config, PathBuf::from("section-runner.toml"));
                assert_eq!(report, None);
            }
            Command::Leaves { .. } => panic!("expected explore"),
        }
    }

    #[test]
    fn parse_leaves() {
        let cli = Cli::parse_from(["section-runner", "leaves", "case.toml"]);
        assert!(matches!(cli.command, Command::Leaves { .. }));
    }

    #[test]
    fn render_failed_pass_names_section() {
        let report = PassReport {
            index: 2,
            leaf: None,
            outcome: PassOutcome::Failed {
                section: "case/A".to_string(),
                message: "boom".to_string(),
            },
        };
        assert_eq!(render_pass(&report), "pass 2: FAILED in case/A (boom) -");
    }
}
