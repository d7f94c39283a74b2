use std::path::PathBuf;

/// How a run ends once the external passes are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Put every file back exactly as it was.
    Discard,
    /// Keep the external edits and map substitutes back to tokens.
    Commit,
}

impl RunMode {
    pub fn from_apply_changes(apply_changes: bool) -> Self {
        if apply_changes {
            RunMode::Commit
        } else {
            RunMode::Discard
        }
    }
}

/// Result of one external pass on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassStatus {
    /// The tool succeeded and reported nothing to fix.
    Passed,
    /// The tool succeeded and reported that it changed the file. Carries
    /// whatever the tool printed about the fixes (may be empty).
    Fixed(String),
    Failed(String),
}

impl PassStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, PassStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub pass: String,
    pub path: PathBuf,
    pub status: PassStatus,
}

/// Per-pass counts derived from the outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub passed: usize,
    pub fixed: usize,
    pub failed: usize,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Restored { files: usize },
    Committed { changed: usize, unchanged: usize },
}

/// Everything a completed run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: RunMode,
    pub files: usize,
    /// Files that contained at least one token.
    pub substituted: usize,
    pub preflight_error: Option<String>,
    pub outcomes: Vec<PassOutcome>,
    pub finish: Finish,
}

impl RunReport {
    /// True when preflight succeeded and no pass failed on any file.
    pub fn success(&self) -> bool {
        self.preflight_error.is_none() && !self.outcomes.iter().any(|o| o.status.is_failed())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PassOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed())
    }

    pub fn summary_for(&self, pass: &str) -> PassSummary {
        let mut summary = PassSummary::default();
        for outcome in self.outcomes.iter().filter(|o| o.pass == pass) {
            match outcome.status {
                PassStatus::Passed => summary.passed += 1,
                PassStatus::Fixed(_) => summary.fixed += 1,
                PassStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}
