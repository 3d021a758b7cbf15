use crate::areas::settings::Settings;
use crate::artifacts::process::{ChildProcessSpec, Disposition, Executor};
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::ffi::OsStr;
use std::path::Path;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    executor: Executor,
    settings: Settings,
}

impl Repository {
    pub fn new(
        path: &Path,
        writer: Box<dyn std::io::Write>,
        executor: Executor,
        settings: Settings,
    ) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Unable to create directory {}", path.display()))?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("Invalid repository path {}", path.display()))?;

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            executor,
            settings,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    /// Swap the output writer, returning the previous one
    pub fn replace_writer(&self, writer: Box<dyn std::io::Write>) -> Box<dyn std::io::Write> {
        self.writer.replace(writer)
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A git invocation running inside the repository
    pub fn git<I, S>(&self, args: I) -> ChildProcessSpec
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut spec = ChildProcessSpec::git();
        spec.args(args).current_dir(&self.path);
        spec
    }

    /// Run git to completion, failing on a non-zero exit
    pub fn run_git<I, S>(&self, args: I, stdout: Disposition) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut spec = self.git(args);
        spec.stdout(stdout);
        let command = spec.command_line();

        match self.executor.run(spec)? {
            0 => Ok(()),
            code => anyhow::bail!("`{command}` exited with status {code}"),
        }
    }

    /// Run git and return its standard output with trailing whitespace removed
    pub fn capture_git<I, S>(&self, args: I) -> anyhow::Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let spec = self.git(args);
        let command = spec.command_line();

        let captured = self.executor.capture(spec)?;
        if captured.code != 0 {
            anyhow::bail!("`{command}` exited with status {}", captured.code);
        }

        let stdout = String::from_utf8(captured.stdout)
            .with_context(|| format!("`{command}` printed invalid UTF-8"))?;
        Ok(stdout.trim_end().to_string())
    }
}
