//! Snapshot, substitute, and the two ways back: restore or commit.
//!
//! A [`Snapshot`] is the only record of the original file contents. It is
//! produced by [`snapshot_and_substitute`] and consumed by exactly one of
//! [`restore`] or [`commit`], so a run cannot finish twice or not at all
//! without the compiler noticing the unused value.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, error, info, instrument};

use crate::core::token_map::TokenMap;
use crate::core::types::RunMode;

#[derive(Debug, Clone)]
struct SnapshotEntry {
    path: PathBuf,
    original: String,
    substituted: bool,
}

/// Original content of every file in a run, in discovery order.
#[derive(Debug)]
#[must_use = "a snapshot must be restored or committed"]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|entry| entry.path.as_path())
    }

    /// Number of files that were rewritten with substitutes.
    pub fn substituted_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.substituted).count()
    }

    #[cfg(test)]
    fn original(&self, path: &Path) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.original.as_str())
    }
}

/// Outcome of a commit pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Files whose final content differs from the original.
    pub changed: usize,
    pub unchanged: usize,
}

/// Read every file, then write back the substituted content.
///
/// All reads happen before the first write, so an unreadable file aborts the
/// run with nothing mutated. In commit mode every file must also survive the
/// reverse mapping unchanged; discard mode restores from the snapshot and
/// skips that check. If a write fails, files already written are restored
/// before the error is returned.
#[instrument(skip_all, fields(files = files.len(), mode = ?mode))]
pub fn snapshot_and_substitute(
    files: &[PathBuf],
    map: &TokenMap,
    mode: RunMode,
) -> Result<Snapshot> {
    let mut entries = Vec::with_capacity(files.len());
    let mut pending = Vec::new();

    for path in files {
        let original =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let substituted = match mode {
            RunMode::Discard => map.substitute(&original),
            RunMode::Commit => map
                .substitute_reversible(&original)
                .with_context(|| format!("substitute tokens in {}", path.display()))?,
        };
        let changed = substituted != original;
        if changed {
            pending.push((entries.len(), substituted));
        }
        entries.push(SnapshotEntry {
            path: path.clone(),
            original,
            substituted: changed,
        });
    }

    let mut written = Vec::new();
    for (index, content) in pending {
        let path = &entries[index].path;
        if let Err(err) = fs::write(path, content) {
            error!(path = %path.display(), err = %err, "write failed during substitution, rolling back");
            let rollback_failures = rollback(&entries, &written);
            return Err(substitution_write_error(err, path, &rollback_failures));
        }
        debug!(path = %path.display(), "temporarily replaced tokens");
        written.push(index);
    }

    let snapshot = Snapshot { entries };
    info!(
        files = snapshot.len(),
        substituted = snapshot.substituted_count(),
        "snapshot taken"
    );
    Ok(snapshot)
}

/// Write the originals of `written` back. Returns one line per file that
/// could not be put back.
fn rollback(entries: &[SnapshotEntry], written: &[usize]) -> Vec<String> {
    let mut failures = Vec::new();
    for &index in written {
        let entry = &entries[index];
        if let Err(err) = fs::write(&entry.path, &entry.original) {
            error!(path = %entry.path.display(), err = %err, "rollback write failed");
            failures.push(format!("{}: {err}", entry.path.display()));
        }
    }
    failures
}

fn substitution_write_error(
    err: io::Error,
    path: &Path,
    rollback_failures: &[String],
) -> anyhow::Error {
    let err = anyhow!(err).context(format!("write {}", path.display()));
    if rollback_failures.is_empty() {
        return err;
    }
    err.context(format!(
        "rollback failed, {} file(s) may still hold substitutes:\n- {}",
        rollback_failures.len(),
        rollback_failures.join("\n- ")
    ))
}

/// Put every file back to its original content.
///
/// Every file is attempted; failures are reported together afterwards.
#[instrument(skip_all, fields(files = snapshot.len()))]
pub fn restore(snapshot: Snapshot) -> Result<usize> {
    let mut failures = Vec::new();
    for entry in &snapshot.entries {
        match fs::write(&entry.path, &entry.original) {
            Ok(()) => debug!(path = %entry.path.display(), "restored original content"),
            Err(err) => {
                error!(path = %entry.path.display(), err = %err, "restore failed");
                failures.push(format!("{}: {err}", entry.path.display()));
            }
        }
    }
    if !failures.is_empty() {
        bail!(
            "failed to restore {} file(s):\n- {}",
            failures.len(),
            failures.join("\n- ")
        );
    }
    Ok(snapshot.len())
}

/// Keep the current on-disk content of every file, with substitutes mapped
/// back to their tokens.
///
/// Every file is written, including ones that end up identical to the
/// original. Failures are reported together after all files were attempted.
#[instrument(skip_all, fields(files = snapshot.len()))]
pub fn commit(map: &TokenMap, snapshot: Snapshot) -> Result<CommitSummary> {
    let mut summary = CommitSummary {
        changed: 0,
        unchanged: 0,
    };
    let mut failures = Vec::new();

    for entry in &snapshot.entries {
        match commit_file(map, &entry.path) {
            Ok(content) => {
                if content == entry.original {
                    summary.unchanged += 1;
                    debug!(path = %entry.path.display(), "restored tokens, no other changes");
                } else {
                    summary.changed += 1;
                    debug!(path = %entry.path.display(), "applied changes");
                }
            }
            Err(err) => {
                error!(path = %entry.path.display(), err = ?err, "commit failed");
                failures.push(format!("{}: {err:#}", entry.path.display()));
            }
        }
    }

    if !failures.is_empty() {
        bail!(
            "failed to commit {} file(s):\n- {}",
            failures.len(),
            failures.join("\n- ")
        );
    }
    Ok(summary)
}

fn commit_file(map: &TokenMap, path: &Path) -> Result<String> {
    let current = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let content = map.reverse(&current);
    fs::write(path, &content).with_context(|| format!("write {}", path.display()))?;
    Ok(content)
}
