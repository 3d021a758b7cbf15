//! Executable lookup
//!
//! - [`Program::Git`] is always searched for on `PATH`
//! - a name without a path separator is searched for on `PATH`
//! - anything else is used literally

use crate::artifacts::process::spec::Program;
use is_executable::IsExecutable;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Name of the version-control engine binary
pub const GIT_BINARY: &str = "git";

/// Resolve `program` to the path that will be executed
///
/// # Returns
///
/// The executable path, or `None` if a `PATH` search found nothing
pub fn resolve_program(program: &Program) -> Option<PathBuf> {
    match program {
        Program::Git => search_path(OsStr::new(GIT_BINARY)),
        Program::Named(name) if has_separator(name) => Some(PathBuf::from(name)),
        Program::Named(name) => search_path(name),
    }
}

fn has_separator(name: &OsStr) -> bool {
    name.to_string_lossy().chars().any(std::path::is_separator)
}

fn search_path(name: &OsStr) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_runnable(candidate))
}

fn is_runnable(candidate: &Path) -> bool {
    candidate.is_file() && candidate.is_executable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn git_is_found_on_path() {
        let git = resolve_program(&Program::Git).expect("git must be installed to run tests");

        assert!(git.is_absolute() || git.components().count() > 1);
        assert_eq!(git.file_name(), Some(OsStr::new(GIT_BINARY)));
    }

    #[test]
    fn bare_name_is_searched_on_path() {
        let sh = resolve_program(&Program::Named("sh".into())).unwrap();

        assert_eq!(sh.file_name(), Some(OsStr::new("sh")));
        assert!(sh.is_executable());
    }

    #[test]
    fn path_with_separator_is_used_literally() {
        let program = Program::Named("./no/such/program".into());

        assert_eq!(
            resolve_program(&program),
            Some(PathBuf::from("./no/such/program"))
        );
    }

    #[test]
    fn unknown_name_is_not_resolved() {
        let program = Program::Named("git-chat-no-such-helper-7f3a".into());

        assert_eq!(resolve_program(&program), None);
    }
}
