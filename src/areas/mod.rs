//! Core repository components
//!
//! - `repository`: the chat space on disk, its output writer and the executor
//!   every helper process is started through
//! - `settings`: per-invocation settings read from the environment

pub mod repository;
pub mod settings;
