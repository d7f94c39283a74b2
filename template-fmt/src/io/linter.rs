//! External tool abstraction for per-file linting and formatting.
//!
//! The [`FileTool`] trait decouples the round trip from the actual linter
//! (ruff by default). Tests use scripted tools that edit files in-process
//! without spawning anything.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, instrument, warn};

use crate::core::types::PassStatus;
use crate::io::config::{LinterConfig, PassConfig};
use crate::io::process::run_command_with_timeout;

/// A tool applied to one file at a time, in one or more ordered passes.
///
/// Implementations must only rewrite the file they are given.
pub trait FileTool {
    /// Pass names, in execution order.
    fn passes(&self) -> Vec<String>;

    /// Check the tool is usable before any pass runs.
    fn preflight(&self) -> Result<()>;

    /// Run pass number `pass` on `path`. An `Err` counts as a failed pass.
    fn run_pass(&self, pass: usize, path: &Path) -> Result<PassStatus>;
}

/// Tool that spawns a configured command per file (`ruff check`, `ruff format`, ...).
#[derive(Debug, Clone)]
pub struct CommandTool {
    config: LinterConfig,
}

impl CommandTool {
    pub fn new(config: LinterConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    fn pass_config(&self, pass: usize) -> Result<&PassConfig> {
        self.config
            .passes
            .get(pass)
            .ok_or_else(|| anyhow!("no linter pass at index {pass}"))
    }
}

impl FileTool for CommandTool {
    fn passes(&self) -> Vec<String> {
        self.config.passes.iter().map(|p| p.name.clone()).collect()
    }

    #[instrument(skip_all, fields(program = %self.config.program))]
    fn preflight(&self) -> Result<()> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.preflight_args);
        let output = run_command_with_timeout(cmd, self.timeout(), self.config.output_limit_bytes)
            .with_context(|| format!("{} not found", self.config.program))?;
        if output.timed_out {
            bail!("{} preflight timed out", self.config.program);
        }
        if !output.status.success() {
            bail!(
                "{} preflight failed with status {:?}: {}",
                self.config.program,
                output.status.code(),
                output.diagnostics()
            );
        }
        debug!("linter available");
        Ok(())
    }

    #[instrument(skip_all, fields(pass = pass, path = %path.display()))]
    fn run_pass(&self, pass: usize, path: &Path) -> Result<PassStatus> {
        let pass_cfg = self.pass_config(pass)?;
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&pass_cfg.args).arg(path);

        let output = run_command_with_timeout(cmd, self.timeout(), self.config.output_limit_bytes)
            .with_context(|| format!("run {} {}", self.config.program, pass_cfg.name))?;

        if output.timed_out {
            warn!(timeout_secs = self.config.timeout_secs, "linter timed out");
            return Ok(PassStatus::Failed(format!(
                "timed out after {}s",
                self.config.timeout_secs
            )));
        }
        let details = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(classify_exit(
            pass_cfg,
            output.status.code(),
            details,
            output.diagnostics(),
        ))
    }
}

/// Map an exit code to a pass status using the pass's ok codes.
///
/// `details` (the tool's stdout) is kept for fixed files; `diagnostics` is
/// used for failures.
fn classify_exit(
    pass: &PassConfig,
    code: Option<i32>,
    details: String,
    diagnostics: String,
) -> PassStatus {
    match code {
        Some(0) if pass.ok_exit_codes.contains(&0) => PassStatus::Passed,
        Some(code) if pass.ok_exit_codes.contains(&code) => PassStatus::Fixed(details),
        Some(code) => PassStatus::Failed(format!("exit status {code}: {diagnostics}")),
        None => PassStatus::Failed(format!("terminated by signal: {diagnostics}")),
    }
}
