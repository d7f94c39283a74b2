//! Lint and format the source files of a project template without tripping
//! over its placeholder tokens.
//!
//! Template tokens such as `{{ cookiecutter.package_name }}` are not valid
//! source, so every token is swapped for an identifier, an external tool runs
//! on each file, and the run then either restores the original bytes or
//! keeps the tool's edits with the tokens put back.
//!
//! - **[`core`]**: Pure logic (token map validation and substitution, report types).
//! - **[`io`]**: Filesystem snapshots, discovery, config, and child processes.
//!
//! [`round_trip`] ties the two together and guarantees the restore or commit
//! step runs once for every file, whatever the tool did.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod round_trip;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
