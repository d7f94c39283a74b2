//! The substitute / external pass / restore-or-commit cycle.
//!
//! Run phases: files are snapshotted and substituted, the tool's passes run
//! over every file, then the run finishes by restoring or committing. Tool
//! failures, panics included, are collected as [`PassOutcome`] values rather
//! than returned as errors, so nothing between the snapshot and the finish
//! can skip the finish.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{info, instrument, warn};

use crate::core::token_map::TokenMap;
use crate::core::types::{Finish, PassOutcome, PassStatus, RunMode, RunReport};
use crate::io::config::FormatConfig;
use crate::io::discover::find_template_files;
use crate::io::linter::FileTool;
use crate::io::snapshot::{Snapshot, commit, restore, snapshot_and_substitute};

/// Run the full cycle over `files`.
///
/// Returns `Err` only for file-access problems in the snapshot or finish
/// steps. Tool failures end up in the report.
#[instrument(skip_all, fields(files = files.len(), mode = ?mode))]
pub fn run_round_trip<T: FileTool>(
    files: &[PathBuf],
    map: &TokenMap,
    tool: &T,
    mode: RunMode,
) -> Result<RunReport> {
    let snapshot = snapshot_and_substitute(files, map, mode).context("substitute tokens")?;
    let substituted = snapshot.substituted_count();

    let (preflight_error, outcomes) = run_passes(tool, &snapshot);

    let finish = finish_run(map, snapshot, mode)?;
    Ok(RunReport {
        mode,
        files: files.len(),
        substituted,
        preflight_error,
        outcomes,
        finish,
    })
}

/// Discover the template files under `root` and run the cycle over them.
///
/// Returns `Ok(None)` when there is nothing to format.
pub fn format_template<T: FileTool>(
    root: &Path,
    config: &FormatConfig,
    tool: &T,
    mode: RunMode,
) -> Result<Option<RunReport>> {
    let map = config.token_map().context("build token map")?;
    let files = find_template_files(root, &config.extensions)?;
    if files.is_empty() {
        info!(root = %root.display(), "no template files found");
        return Ok(None);
    }
    info!(root = %root.display(), count = files.len(), "found template files");
    run_round_trip(&files, &map, tool, mode).map(Some)
}

/// Preflight, then every pass over every file. Never fails or unwinds.
fn run_passes<T: FileTool>(tool: &T, snapshot: &Snapshot) -> (Option<String>, Vec<PassOutcome>) {
    let passes = match guarded(|| {
        tool.preflight()?;
        Ok(tool.passes())
    }) {
        Ok(passes) => passes,
        Err(err) => {
            warn!(err = ?err, "tool preflight failed, skipping passes");
            return (Some(format!("{err:#}")), Vec::new());
        }
    };

    let mut outcomes = Vec::new();
    for (index, pass) in passes.into_iter().enumerate() {
        info!(pass = %pass, "running pass");
        for path in snapshot.paths() {
            let status = match guarded(|| tool.run_pass(index, path)) {
                Ok(status) => status,
                Err(err) => PassStatus::Failed(format!("{err:#}")),
            };
            if let PassStatus::Failed(message) = &status {
                warn!(pass = %pass, path = %path.display(), message = %message, "pass failed");
            }
            outcomes.push(PassOutcome {
                pass: pass.clone(),
                path: path.to_path_buf(),
                status,
            });
        }
    }
    (None, outcomes)
}

/// Run a tool call, turning a panic into an error.
fn guarded<R>(call: impl FnOnce() -> Result<R>) -> Result<R> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("tool panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

fn finish_run(map: &TokenMap, snapshot: Snapshot, mode: RunMode) -> Result<Finish> {
    match mode {
        RunMode::Discard => {
            let files = restore(snapshot).context("restore original content")?;
            info!(files, "restored original content");
            Ok(Finish::Restored { files })
        }
        RunMode::Commit => {
            let summary = commit(map, snapshot).context("apply changes")?;
            info!(
                changed = summary.changed,
                unchanged = summary.unchanged,
                "applied changes"
            );
            Ok(Finish::Committed {
                changed: summary.changed,
                unchanged: summary.unchanged,
            })
        }
    }
}
