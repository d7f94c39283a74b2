//! Deterministic, pure logic shared by the formatter.
//!
//! Core modules do no I/O. They operate on in-memory strings and return
//! deterministic outputs suitable for tests.

pub mod token_map;
pub mod types;
