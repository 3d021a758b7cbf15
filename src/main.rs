use anyhow::Result;
use clap::{Parser, Subcommand};
use git_chat::areas::repository::Repository;
use git_chat::areas::settings::Settings;
use git_chat::artifacts::process::Executor;
use git_chat::commands::porcelain::read::ReadOptions;
use is_terminal::IsTerminal;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "git-chat",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Messaging on top of git history",
    long_about = "This tool keeps a conversation in the commit history of a git repository. \
    Every message is a commit, and reading the conversation walks history through git itself, \
    so the chat replicates wherever the repository does.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short = 'C',
        global = true,
        value_name = "path",
        help = "Run as if started in <path>"
    )]
    directory: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Create a new chat space",
        long_about = "This command initializes a git repository in the current directory or at the \
        specified path and commits the chat space configuration as its first line of history."
    )]
    Init {
        #[arg(index = 1, help = "The path to the chat space")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "message",
        about = "Post a message",
        long_about = "This command records a message as a new commit on the current line of history."
    )]
    Message {
        #[arg(short, long, help = "The message text")]
        message: String,
    },
    #[command(
        name = "read",
        about = "Read messages, newest first",
        long_about = "This command walks the first-parent history from HEAD, or shows a single \
        commit when one is given, and prints every message it finds."
    )]
    Read {
        #[arg(index = 1, help = "Show only this commit")]
        commit: Option<String>,
        #[arg(short = 'n', long = "max-count", help = "Limit the number of messages shown")]
        limit: Option<NonZeroUsize>,
        #[arg(long, help = "Show each message on a single line")]
        oneline: bool,
        #[arg(long = "abbrev-commit", help = "Show abbreviated commit ids")]
        abbrev_commit: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("GIT_CHAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let stdout_is_terminal = std::io::stdout().is_terminal();
    if !stdout_is_terminal {
        colored::control::set_override(false);
    }

    let pwd = match &cli.directory {
        Some(directory) => directory.clone(),
        None => std::env::current_dir()?,
    };
    let open = |path: PathBuf| {
        Repository::new(
            &path,
            Box::new(std::io::stdout()),
            Executor::new(),
            Settings::load_from_env(),
        )
    };

    match cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) if path.is_relative() => pwd.join(path),
                Some(path) => path,
                None => pwd,
            };
            open(path)?.init()?
        }
        Commands::Message { message } => open(pwd)?.message(&message)?,
        Commands::Read {
            commit,
            limit,
            oneline,
            abbrev_commit,
        } => {
            let repository = open(pwd)?;
            if stdout_is_terminal {
                repository.start_pager()?;
            }

            repository.read(&ReadOptions::new(commit, limit, oneline, abbrev_commit))?
        }
    }

    Ok(())
}
