//! Git object types
//!
//! Only commits are read by this crate. They arrive as raw object content from
//! the batch object dumper and are parsed into [`commit::CommitRecord`]s:
//!
//! - `object_id`: 20-byte identifiers and their hex text form
//! - `commit`: signatures, commit records and the commit object parser

pub mod commit;
pub mod object_id;

/// Length of a SHA-1 hash in raw bytes
pub const OBJECT_ID_LENGTH: usize = 20;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_HEX_LENGTH: usize = 40;
