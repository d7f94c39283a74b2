//! Stable exit codes for the `template-fmt` CLI.

/// Every pass succeeded and files were restored or committed.
pub const OK: i32 = 0;
/// Invalid config, missing template directory, or a file could not be read,
/// restored, or committed.
pub const INVALID: i32 = 1;
/// Files were restored or committed, but the tool was unavailable or a pass
/// failed on at least one file.
pub const TOOL_FAILED: i32 = 2;
