//! Data structures and algorithms
//!
//! - `core`: Shared utilities (pager writer)
//! - `log`: Commit history traversal through the chained helper processes
//! - `objects`: Object identifiers and commit records
//! - `process`: The subprocess execution engine

pub mod core;
pub mod log;
pub mod objects;
pub mod process;
