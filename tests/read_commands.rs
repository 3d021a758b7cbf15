use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;
use common::command::{
    chat_dir, commit_shas, get_head_commit_sha, post_message, repository_dir, run_chat_command,
    run_git,
};

fn read_stdout(dir: &std::path::Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_chat_command(dir, args).assert().success();
    Ok(String::from_utf8(output.get_output().stdout.clone())?)
}

#[rstest]
fn read_two_commit_history_newest_first(
    chat_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = get_head_commit_sha(chat_dir.path());
    post_message(chat_dir.path(), "hello").assert().success();
    let second = get_head_commit_sha(chat_dir.path());

    let stdout = read_stdout(chat_dir.path(), &["read", "-n", "2"])?;

    assert_eq!(commit_shas(&stdout), vec![second, root]);
    assert!(stdout.contains("Author: Ada Lovelace <ada@example.com>"));
    assert!(stdout.contains("\n    hello\n"));
    assert!(stdout.contains("\n    Create chat space\n"));

    Ok(())
}

#[rstest]
fn read_with_limit_one_shows_only_newest(
    chat_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    post_message(chat_dir.path(), "hello").assert().success();
    let second = get_head_commit_sha(chat_dir.path());

    let stdout = read_stdout(chat_dir.path(), &["read", "-n", "1"])?;

    assert_eq!(commit_shas(&stdout), vec![second]);

    Ok(())
}

#[rstest]
fn read_without_limit_walks_whole_history(
    chat_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    for i in 1..=5 {
        post_message(chat_dir.path(), &format!("Message {i}"))
            .assert()
            .success();
    }

    let stdout = read_stdout(chat_dir.path(), &["read", "--oneline"])?;
    let subjects: Vec<&str> = stdout
        .lines()
        .map(|line| line.split_once(' ').map(|(_, subject)| subject).unwrap())
        .collect();

    assert_eq!(
        subjects,
        vec![
            "Message 5",
            "Message 4",
            "Message 3",
            "Message 2",
            "Message 1",
            "Create chat space"
        ]
    );

    Ok(())
}

#[rstest]
fn read_explicit_commit_shows_exactly_that_commit(
    chat_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    post_message(chat_dir.path(), "first").assert().success();
    let first = get_head_commit_sha(chat_dir.path());
    post_message(chat_dir.path(), "second").assert().success();

    let stdout = read_stdout(chat_dir.path(), &["read", &first, "-n", "5"])?;

    assert_eq!(commit_shas(&stdout), vec![first]);
    assert!(stdout.contains("    first"));

    Ok(())
}

#[rstest]
fn read_oneline_with_abbrev_commit(chat_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    post_message(chat_dir.path(), "subject line\n\nmore detail")
        .assert()
        .success();
    let head = get_head_commit_sha(chat_dir.path());

    let stdout = read_stdout(
        chat_dir.path(),
        &["read", "-n", "1", "--oneline", "--abbrev-commit"],
    )?;

    assert_eq!(stdout, format!("{} subject line\n", &head[..7]));

    Ok(())
}

#[rstest]
fn read_skips_merges_and_side_branches(
    chat_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = chat_dir.path();
    post_message(dir, "on main").assert().success();
    run_git(dir, &["checkout", "-q", "-b", "side"]);
    run_git(dir, &["commit", "-q", "--allow-empty", "-m", "on side"]);
    run_git(dir, &["checkout", "-q", "-"]);
    post_message(dir, "main again").assert().success();
    run_git(dir, &["merge", "-q", "--no-ff", "-m", "merge side", "side"]);

    let stdout = read_stdout(dir, &["read", "--oneline"])?;
    let subjects: Vec<&str> = stdout
        .lines()
        .map(|line| line.split_once(' ').map(|(_, subject)| subject).unwrap())
        .collect();

    assert_eq!(subjects, vec!["main again", "on main", "Create chat space"]);

    Ok(())
}

#[rstest]
fn message_shaped_like_batch_header_is_read_as_text(
    chat_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = get_head_commit_sha(chat_dir.path());
    let forged = format!("0123456789abcdef {root} commit 12");
    post_message(chat_dir.path(), &format!("innocent\n{forged}\nnothing here"))
        .assert()
        .success();
    let head = get_head_commit_sha(chat_dir.path());

    let stdout = read_stdout(chat_dir.path(), &["read"])?;

    assert_eq!(commit_shas(&stdout), vec![head, root]);
    assert!(stdout.contains(&format!("    {forged}\n")));

    Ok(())
}

#[rstest]
fn read_without_history_fails(repository_dir: TempDir) {
    run_git(repository_dir.path(), &["init", "-q"]);

    run_chat_command(repository_dir.path(), &["read"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not read history"));
}

#[rstest]
fn read_unknown_revision_fails(chat_dir: TempDir) {
    run_chat_command(chat_dir.path(), &["read", "no-such-branch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read history"))
        .stderr(predicate::str::contains("rev-list exited with status"));
}

#[rstest]
fn read_start_point_is_never_an_option(chat_dir: TempDir) {
    post_message(chat_dir.path(), "hello").assert().success();

    run_chat_command(chat_dir.path(), &["read", "--", "--all"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("rev-list exited with status"));
}
