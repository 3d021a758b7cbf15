//! Messaging on top of a git repository's commit history
//!
//! Messages are commits. Reading them means walking history through the
//! version-control engine's own helpers, so the crate is built around a
//! subprocess execution engine and a streaming commit reader:
//!
//! - `areas`: the repository a command works on and its settings
//! - `artifacts`: object ids, commit parsing, process execution, traversal
//! - `commands`: the user-facing commands

pub mod areas;
pub mod artifacts;
pub mod commands;
