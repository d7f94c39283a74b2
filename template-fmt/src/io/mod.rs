//! I/O helpers: configuration, discovery, file snapshots, and child processes.

pub mod config;
pub mod discover;
pub mod linter;
pub mod process;
pub mod snapshot;
