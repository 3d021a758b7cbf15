use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;
use common::command::{repository_dir, run_chat_command, run_git};

#[rstest]
fn init_creates_chat_space_with_first_commit(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let absolute_path = repository_dir.path().canonicalize()?.display().to_string();

    run_chat_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Initialized chat space in"))
        .stdout(predicate::str::contains(absolute_path));

    let config = std::fs::read_to_string(repository_dir.path().join(".git-chat/config"))?;
    assert!(config.starts_with("[channel \""));

    let tracked = run_git(repository_dir.path(), &["ls-files"]);
    assert_eq!(tracked, ".git-chat/config");

    let subjects = run_git(repository_dir.path(), &["log", "--format=%s"]);
    assert_eq!(subjects, "Create chat space");

    Ok(())
}

#[rstest]
fn init_at_relative_path(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_chat_command(repository_dir.path(), &["init", "room"])
        .assert()
        .success();

    assert!(repository_dir.path().join("room/.git-chat/config").is_file());
    assert!(repository_dir.path().join("room/.git").is_dir());

    Ok(())
}

#[rstest]
fn init_twice_fails(repository_dir: TempDir) {
    run_chat_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_chat_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is already a chat space"));
}
