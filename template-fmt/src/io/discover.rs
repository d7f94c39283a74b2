//! Template file discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use walkdir::WalkDir;

/// Recursively collect regular files under `root` whose extension is one of
/// `extensions`, sorted by path.
pub fn find_template_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("template directory not found: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want == ext));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!(root = %root.display(), count = files.len(), "discovered template files");
    Ok(files)
}
