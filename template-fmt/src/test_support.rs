//! Test-only helpers: scratch template trees and scripted tools.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::core::types::PassStatus;
use crate::io::linter::FileTool;

/// Temporary template tree. Removed on drop.
pub struct TemplateDir {
    dir: tempfile::TempDir,
}

impl TemplateDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        let path = self.dir.path().join(rel);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }
}

type Edit = Box<dyn Fn(&str) -> String>;

/// In-process [`FileTool`] that rewrites files with a closure.
///
/// Records the content it was handed on every call, and can be told to fail
/// preflight, or to fail or panic on files with a given name.
pub struct ScriptedTool {
    passes: Vec<String>,
    edit: Edit,
    fail_on: Vec<String>,
    panic_on: Vec<String>,
    preflight_error: Option<String>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedTool {
    /// Single `format` pass applying `edit` to every file.
    pub fn new(edit: impl Fn(&str) -> String + 'static) -> Self {
        Self {
            passes: vec!["format".to_string()],
            edit: Box::new(edit),
            fail_on: Vec::new(),
            panic_on: Vec::new(),
            preflight_error: None,
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn noop() -> Self {
        Self::new(|content| content.to_string())
    }

    pub fn appending(suffix: &str) -> Self {
        let suffix = suffix.to_string();
        Self::new(move |content| format!("{content}{suffix}"))
    }

    pub fn with_passes(mut self, passes: &[&str]) -> Self {
        self.passes = passes.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Fail (without editing) on every file whose name is `file_name`.
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.fail_on.push(file_name.to_string());
        self
    }

    /// Panic (without editing) on every file whose name is `file_name`.
    pub fn panicking_on(mut self, file_name: &str) -> Self {
        self.panic_on.push(file_name.to_string());
        self
    }

    pub fn with_preflight_error(mut self, message: &str) -> Self {
        self.preflight_error = Some(message.to_string());
        self
    }

    /// Content handed to the tool, one entry per call, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl FileTool for ScriptedTool {
    fn passes(&self) -> Vec<String> {
        self.passes.clone()
    }

    fn preflight(&self) -> Result<()> {
        match &self.preflight_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }

    fn run_pass(&self, _pass: usize, path: &Path) -> Result<PassStatus> {
        let content =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        self.seen.borrow_mut().push(content.clone());

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_on.contains(&name) {
            return Err(anyhow!("scripted failure for {name}"));
        }
        if self.panic_on.contains(&name) {
            panic!("scripted panic for {name}");
        }

        let edited = (self.edit)(&content);
        if edited == content {
            return Ok(PassStatus::Passed);
        }
        fs::write(path, edited).with_context(|| format!("write {}", path.display()))?;
        Ok(PassStatus::Fixed(String::new()))
    }
}
