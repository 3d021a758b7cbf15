//! Chat command implementations
//!
//! Every command is a method on [`Repository`](crate::areas::repository::Repository)
//! and reaches the version-control engine only through the subprocess
//! execution engine.
//!
//! - `porcelain`: the user-facing commands (init, message, read)

pub mod porcelain;
