//! Porcelain commands (user-facing chat operations)
//!
//! ## Commands
//!
//! - `init`: Create a chat space with its first line of history
//! - `message`: Record a message as a commit
//! - `read`: Show messages, newest first

pub mod init;
pub mod message;
pub mod read;
