use crate::common::GIT_ENV;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn chat_dir(repository_dir: TempDir) -> TempDir {
    run_chat_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_chat_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("git-chat").expect("Failed to find git-chat binary");
    cmd.current_dir(dir)
        .args(args)
        .envs(GIT_ENV)
        .env("GIT_CHAT_NO_PAGER", "1")
        .env_remove("GIT_CHAT_LOG");
    cmd
}

pub fn post_message(dir: &Path, text: &str) -> Command {
    run_chat_command(dir, &["message", "-m", text])
}

/// Run git directly, returning trimmed stdout and panicking on failure
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .current_dir(dir)
        .args(args)
        .envs(GIT_ENV)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout)
        .expect("git printed invalid UTF-8")
        .trim()
        .to_string()
}

pub fn get_head_commit_sha(dir: &Path) -> String {
    run_git(dir, &["rev-parse", "HEAD"])
}

/// Commit SHAs from `read` output in medium format
pub fn commit_shas(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(str::to_string)
        .collect()
}
