//! Format the Python files of a cookiecutter template.
//!
//! Placeholder tokens are swapped for identifiers while the linter runs.
//! By default every file is restored afterwards; `--apply-changes` keeps the
//! linter's edits with the tokens put back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use template_fmt::core::types::{Finish, PassStatus, RunMode, RunReport};
use template_fmt::exit_codes;
use template_fmt::io::config::{DEFAULT_CONFIG_PATH, load_config};
use template_fmt::io::linter::{CommandTool, FileTool};
use template_fmt::logging;
use template_fmt::round_trip::format_template;

#[derive(Parser)]
#[command(
    name = "template-fmt",
    version,
    about = "Format cookiecutter template files around their placeholder tokens"
)]
struct Cli {
    /// Keep the formatting changes (default: restore every file afterwards).
    #[arg(long)]
    apply_changes: bool,

    /// Template root to format (overrides `template_dir` from the config).
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Config file; defaults apply when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() {
    logging::init();
    match run(Cli::parse()) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli.config).context("load config")?;
    let root = cli
        .template_dir
        .unwrap_or_else(|| config.template_dir.clone());
    let mode = RunMode::from_apply_changes(cli.apply_changes);
    debug!(root = %root.display(), ?mode, "starting");

    println!("template: {}", root.display());
    match mode {
        RunMode::Discard => {
            println!("mode: discard (use --apply-changes to keep formatting changes)")
        }
        RunMode::Commit => println!("mode: commit (formatting changes will be kept)"),
    }

    let tool = CommandTool::new(config.linter.clone());
    let Some(report) = format_template(&root, &config, &tool, mode)? else {
        println!("files: 0 (nothing to format)");
        return Ok(exit_codes::OK);
    };

    print_report(&report, &tool.passes());
    if report.success() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::TOOL_FAILED)
    }
}

fn print_report(report: &RunReport, passes: &[String]) {
    println!(
        "files: {} (tokens replaced in {})",
        report.files, report.substituted
    );
    if let Some(err) = &report.preflight_error {
        println!("preflight: failed: {err}");
    }
    for outcome in &report.outcomes {
        match &outcome.status {
            PassStatus::Passed => println!("{}: ok {}", outcome.pass, outcome.path.display()),
            PassStatus::Fixed(details) => {
                println!("{}: fixed {}", outcome.pass, outcome.path.display());
                if !details.is_empty() {
                    println!("  details: {details}");
                }
            }
            PassStatus::Failed(message) => println!(
                "{}: failed {}: {}",
                outcome.pass,
                outcome.path.display(),
                message
            ),
        }
    }
    if report.preflight_error.is_none() {
        for pass in passes {
            let summary = report.summary_for(pass);
            println!(
                "{}: passed={} fixed={} failed={}",
                pass, summary.passed, summary.fixed, summary.failed
            );
        }
    }
    match report.finish {
        Finish::Restored { files } => println!("restored: files={files}"),
        Finish::Committed { changed, unchanged } => {
            println!("committed: changed={changed} unchanged={unchanged}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_to_discard() {
        let cli = Cli::parse_from(["template-fmt"]);
        assert!(!cli.apply_changes);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(cli.template_dir.is_none());
    }

    #[test]
    fn parse_apply_changes() {
        let cli = Cli::parse_from(["template-fmt", "--apply-changes", "--template-dir", "skel"]);
        assert!(cli.apply_changes);
        assert_eq!(cli.template_dir, Some(PathBuf::from("skel")));
    }
}
