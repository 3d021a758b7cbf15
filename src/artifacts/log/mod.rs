//! Commit history traversal
//!
//! This module reads history through the version-control engine's helpers:
//!
//! - `batch`: framing of batch object dump output, guarded by a per-run delimiter
//! - `rev_list`: spawning the chained lister/dumper pair and streaming commits
//!   to a callback
//!
//! ## Order
//!
//! Commits are delivered in the order the lister emits them: newest first,
//! following first parents only, merge commits left out by the lister itself.

pub mod batch;
pub mod rev_list;
