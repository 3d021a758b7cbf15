//! Subprocess execution engine
//!
//! Everything this crate learns about history comes from helper processes
//! (the version-control engine's own subcommands). This module owns their
//! lifecycle:
//!
//! - `spec`: [`ChildProcessSpec`], the description of a process to run
//! - `environment`: merging the parent environment with per-process overrides
//! - `resolve`: locating the executable on `PATH`
//! - `executor`: [`Executor`], spawning, piping and reaping children
//! - `error`: [`ExecError`], the failures that abort the current command
//!
//! ## Usage patterns
//!
//! - `run`: fire-and-forget, returns the exit code
//! - `capture`: collect standard output into a buffer
//! - `spawn` / `finish`: explicit lifecycle, for chaining children through pipes

pub mod environment;
pub mod error;
pub mod executor;
pub mod resolve;
pub mod spec;

pub use error::{ExecError, StdStream};
pub use executor::{Captured, Executor, FatalHandler, ProcessHandle};
pub use spec::{ChildProcessSpec, Disposition, Endpoint, Program};
