//! Description of a child process
//!
//! A [`ChildProcessSpec`] starts out empty, with every standard stream
//! inherited from the parent. The caller adds arguments, environment overrides
//! and stream dispositions, then hands it to [`Executor::spawn`], which consumes
//! it. Because spawning takes the spec by value, a spec can never be started
//! twice.
//!
//! [`Executor::spawn`]: crate::artifacts::process::Executor::spawn

use crate::artifacts::process::error::StdStream;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::io::{self, PipeReader, PipeWriter};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Which executable to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    /// The version-control engine binary, looked up on `PATH`
    Git,
    /// An explicit name (looked up on `PATH`) or path (used as is)
    Named(OsString),
}

impl Program {
    pub fn display(&self) -> String {
        match self {
            Program::Git => "git".to_string(),
            Program::Named(name) => name.to_string_lossy().into_owned(),
        }
    }
}

/// One end of a pipe handed to a child
///
/// The caller creates the pipe, gives one end to the spec and keeps the other.
#[derive(Debug)]
pub enum Endpoint {
    Reader(PipeReader),
    Writer(PipeWriter),
}

impl Endpoint {
    pub(crate) fn try_clone(&self) -> io::Result<Endpoint> {
        match self {
            Endpoint::Reader(reader) => reader.try_clone().map(Endpoint::Reader),
            Endpoint::Writer(writer) => writer.try_clone().map(Endpoint::Writer),
        }
    }
}

impl From<PipeReader> for Endpoint {
    fn from(reader: PipeReader) -> Self {
        Endpoint::Reader(reader)
    }
}

impl From<PipeWriter> for Endpoint {
    fn from(writer: PipeWriter) -> Self {
        Endpoint::Writer(writer)
    }
}

impl From<Endpoint> for Stdio {
    fn from(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Reader(reader) => Stdio::from(reader),
            Endpoint::Writer(writer) => Stdio::from(writer),
        }
    }
}

/// Treatment of one standard stream of the child
#[derive(Debug, Default)]
pub enum Disposition {
    /// Shared with the parent
    #[default]
    Inherited,
    /// Connected to a caller-supplied pipe end
    Provisioned(Endpoint),
    /// Connected to the platform's null device
    Null,
}

impl Disposition {
    pub fn is_provisioned(&self) -> bool {
        matches!(self, Disposition::Provisioned(_))
    }

    /// Build the `Stdio` for one spawn attempt, leaving the spec's own end intact
    pub(crate) fn to_stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Disposition::Inherited => Stdio::inherit(),
            Disposition::Provisioned(endpoint) => endpoint.try_clone()?.into(),
            Disposition::Null => Stdio::null(),
        })
    }

    fn label(&self) -> &'static str {
        match self {
            Disposition::Inherited => "inherited",
            Disposition::Provisioned(_) => "provisioned",
            Disposition::Null => "null",
        }
    }
}

/// A process to run: program, arguments, environment overrides, working
/// directory and stream dispositions
#[derive(Debug)]
pub struct ChildProcessSpec {
    program: Program,
    args: Vec<OsString>,
    env: BTreeMap<OsString, OsString>,
    current_dir: Option<PathBuf>,
    stdin: Disposition,
    stdout: Disposition,
    stderr: Disposition,
}

impl ChildProcessSpec {
    pub fn new(program: Program) -> Self {
        ChildProcessSpec {
            program,
            args: Vec::new(),
            env: BTreeMap::new(),
            current_dir: None,
            stdin: Disposition::Inherited,
            stdout: Disposition::Inherited,
            stderr: Disposition::Inherited,
        }
    }

    /// A spec for the version-control engine binary
    pub fn git() -> Self {
        Self::new(Program::Git)
    }

    /// A spec for a named program or an explicit path
    pub fn program(name: impl Into<OsString>) -> Self {
        Self::new(Program::Named(name.into()))
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// Override one environment variable; later calls for the same key win
    pub fn env(&mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> &mut Self {
        self.env
            .insert(key.as_ref().to_os_string(), value.as_ref().to_os_string());
        self
    }

    pub fn current_dir(&mut self, dir: impl AsRef<Path>) -> &mut Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn stdin(&mut self, disposition: Disposition) -> &mut Self {
        self.stdin = disposition;
        self
    }

    pub fn stdout(&mut self, disposition: Disposition) -> &mut Self {
        self.stdout = disposition;
        self
    }

    pub fn stderr(&mut self, disposition: Disposition) -> &mut Self {
        self.stderr = disposition;
        self
    }

    pub fn get_program(&self) -> &Program {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_env(&self) -> &BTreeMap<OsString, OsString> {
        &self.env
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn disposition(&self, stream: StdStream) -> &Disposition {
        match stream {
            StdStream::Stdin => &self.stdin,
            StdStream::Stdout => &self.stdout,
            StdStream::Stderr => &self.stderr,
        }
    }

    /// The first stream, in stdin/stdout/stderr order, connected to a caller pipe
    pub fn provisioned_stream(&self) -> Option<StdStream> {
        [StdStream::Stdin, StdStream::Stdout, StdStream::Stderr]
            .into_iter()
            .find(|&stream| self.disposition(stream).is_provisioned())
    }

    /// Program and arguments joined for diagnostics
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display())
            .chain(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn dispositions_label(&self) -> String {
        format!(
            "stdin={} stdout={} stderr={}",
            self.stdin.label(),
            self.stdout.label(),
            self.stderr.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_spec_inherits_every_stream() {
        let spec = ChildProcessSpec::git();

        assert_eq!(spec.get_program(), &Program::Git);
        assert!(spec.get_args().is_empty());
        assert_eq!(spec.provisioned_stream(), None);
        assert_eq!(
            spec.dispositions_label(),
            "stdin=inherited stdout=inherited stderr=inherited"
        );
    }

    #[test]
    fn provisioned_stream_reports_first_in_order() -> io::Result<()> {
        let (reader, writer) = io::pipe()?;
        let mut spec = ChildProcessSpec::program("cat");
        spec.stdout(Disposition::Provisioned(writer.into()))
            .stderr(Disposition::Null);
        assert_eq!(spec.provisioned_stream(), Some(StdStream::Stdout));

        spec.stdin(Disposition::Provisioned(reader.into()));
        assert_eq!(spec.provisioned_stream(), Some(StdStream::Stdin));

        Ok(())
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let mut spec = ChildProcessSpec::git();
        spec.args(["rev-list", "--first-parent"]).arg("HEAD");

        assert_eq!(spec.command_line(), "git rev-list --first-parent HEAD");
    }

    #[test]
    fn env_overrides_keep_last_value() {
        let mut spec = ChildProcessSpec::program("env");
        spec.env("A", "1").env("A", "2");

        assert_eq!(
            spec.get_env().get(OsStr::new("A")),
            Some(&OsString::from("2"))
        );
    }
}
