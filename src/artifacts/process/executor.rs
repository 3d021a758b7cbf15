//! Spawning, piping and reaping child processes
//!
//! The executor resolves the program, merges the environment, applies the
//! working directory and stream dispositions and starts the child. Failures
//! that happen in the child after it was created but before the target
//! program runs (working directory change, `exec` itself) come back to the
//! parent through the close-on-exec status pipe the standard library keeps
//! for every spawn, and surface here as [`ExecError::Start`].
//!
//! Targets the kernel refuses to execute directly (a script without an
//! interpreter line) are retried once through `sh -c` with the command line
//! collapsed into a single string.
//!
//! Every [`ExecError`] is reported to the executor's [`FatalHandler`] before it
//! is returned. The default handler prints the diagnostic and terminates the
//! process; tests install one that only records.

use crate::artifacts::process::environment::{Environment, inherited_environment};
use crate::artifacts::process::error::{ExecError, StdStream};
use crate::artifacts::process::resolve::resolve_program;
use crate::artifacts::process::spec::{ChildProcessSpec, Disposition};
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::sync::Arc;
use tracing::{debug, warn};

/// Exit status used when the default fatal handler terminates the process
pub const FATAL_EXIT_CODE: i32 = 128;

const SHELL: &str = "/bin/sh";

/// Strategy invoked with every fatal engine error
pub type FatalHandler = Arc<dyn Fn(&ExecError) + Send + Sync>;

/// Exit code and standard output of a captured child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub code: i32,
    pub stdout: Vec<u8>,
}

/// A running child process
///
/// Obtained from [`Executor::spawn`] and consumed by [`Executor::finish`]. A
/// handle dropped without being finished still reaps its child.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    program: String,
    reaped: bool,
}

impl ProcessHandle {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }

        let pid = self.child.id();
        match self.child.wait() {
            Ok(status) => debug!(pid, program = %self.program, %status, "reaped unfinished child"),
            Err(error) => debug!(pid, program = %self.program, %error, "cannot reap unfinished child"),
        }
    }
}

/// Whether a child's death by `SIGPIPE` is worth a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrokenPipe {
    Unexpected,
    /// The caller closed the child's output before it was done writing
    Expected,
}

#[derive(Clone)]
pub struct Executor {
    fatal: FatalHandler,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    /// Executor whose fatal errors terminate the process
    pub fn new() -> Self {
        Self::with_fatal_handler(Arc::new(terminate))
    }

    pub fn with_fatal_handler(fatal: FatalHandler) -> Self {
        Executor { fatal }
    }

    /// Report a fatal error to the handler and return it
    pub(crate) fn raise<T>(&self, error: ExecError) -> Result<T, ExecError> {
        (self.fatal)(&error);
        Err(error)
    }

    /// Spawn the child and wait for it
    ///
    /// # Returns
    ///
    /// The child's exit code. Specs with a provisioned stream are rejected
    /// before anything is spawned.
    pub fn run(&self, spec: ChildProcessSpec) -> Result<i32, ExecError> {
        if let Some(stream) = spec.provisioned_stream() {
            return self.raise(ExecError::ProvisionedStream {
                operation: "run",
                stream,
            });
        }

        let handle = self.spawn(spec)?;
        self.finish(handle)
    }

    /// Spawn the child with its stdout connected to an internal pipe, drain
    /// the pipe to end-of-stream and wait for the child
    pub fn capture(&self, mut spec: ChildProcessSpec) -> Result<Captured, ExecError> {
        if let Some(stream) = spec.provisioned_stream() {
            return self.raise(ExecError::ProvisionedStream {
                operation: "capture",
                stream,
            });
        }

        let (mut reader, writer) = match io::pipe() {
            Ok(pipe) => pipe,
            Err(source) => return self.raise(ExecError::Pipe(source)),
        };
        spec.stdout(Disposition::Provisioned(writer.into()));

        let handle = self.spawn(spec)?;
        let mut stdout = Vec::new();
        let drained = reader.read_to_end(&mut stdout);
        drop(reader);

        let program = handle.program().to_string();
        let code = self.finish(handle)?;
        if let Err(source) = drained {
            return self.raise(ExecError::Read { program, source });
        }

        Ok(Captured { code, stdout })
    }

    /// Start the child described by `spec`
    ///
    /// The spec is consumed: pipe ends it carries are handed to the child and
    /// closed in the parent once the child is running.
    pub fn spawn(&self, spec: ChildProcessSpec) -> Result<ProcessHandle, ExecError> {
        let program = spec.get_program().display();
        let Some(path) = resolve_program(spec.get_program()) else {
            return self.raise(ExecError::ProgramNotFound(program));
        };
        let environment = inherited_environment(spec.get_env());

        debug!(
            command = %spec.command_line(),
            path = %path.display(),
            cwd = ?spec.get_current_dir(),
            streams = %spec.dispositions_label(),
            "spawning child"
        );

        let mut command = self.command(&spec, &path, &environment, false)?;
        let child = match command.spawn() {
            Ok(child) => child,
            Err(error) if is_not_executable(&error) => {
                debug!(path = %path.display(), "not directly executable, retrying through {SHELL}");
                let mut command = self.command(&spec, &path, &environment, true)?;
                match command.spawn() {
                    Ok(child) => child,
                    Err(source) => return self.raise(ExecError::Start { program, source }),
                }
            }
            Err(source) => return self.raise(ExecError::Start { program, source }),
        };

        debug!(pid = child.id(), program = %program, "child started");
        Ok(ProcessHandle {
            child,
            program,
            reaped: false,
        })
    }

    /// Wait for the child to terminate and return its exit code
    ///
    /// A child killed by a signal is logged and reported as `128 + signal`.
    pub fn finish(&self, handle: ProcessHandle) -> Result<i32, ExecError> {
        self.reap(handle, BrokenPipe::Unexpected)
    }

    /// Like [`Executor::finish`], for a child whose output the caller stopped reading
    ///
    /// Death by `SIGPIPE` is the normal end of such a child and is only logged
    /// at debug level. It is still reported as `128 + signal`.
    pub fn finish_after_close(&self, handle: ProcessHandle) -> Result<i32, ExecError> {
        self.reap(handle, BrokenPipe::Expected)
    }

    fn reap(&self, mut handle: ProcessHandle, broken_pipe: BrokenPipe) -> Result<i32, ExecError> {
        let pid = handle.child.id();
        let waited = handle.child.wait();
        handle.reaped = true;

        let status = match waited {
            Ok(status) => status,
            Err(source) => {
                let program = std::mem::take(&mut handle.program);
                return self.raise(ExecError::Wait { program, pid, source });
            }
        };

        let code = exit_code(&handle.program, pid, status, broken_pipe);
        debug!(pid, program = %handle.program, code, "child finished");
        Ok(code)
    }

    fn command(
        &self,
        spec: &ChildProcessSpec,
        path: &Path,
        environment: &Environment,
        via_shell: bool,
    ) -> Result<Command, ExecError> {
        let mut command = if via_shell {
            let mut command = Command::new(SHELL);
            command.arg("-c").arg(shell_command_line(path, spec));
            command
        } else {
            let mut command = Command::new(path);
            command.args(spec.get_args());
            command
        };

        command.env_clear().envs(environment);
        if let Some(dir) = spec.get_current_dir() {
            command.current_dir(dir);
        }

        command.stdin(self.stdio(spec, StdStream::Stdin)?);
        command.stdout(self.stdio(spec, StdStream::Stdout)?);
        command.stderr(self.stdio(spec, StdStream::Stderr)?);

        Ok(command)
    }

    fn stdio(
        &self,
        spec: &ChildProcessSpec,
        stream: StdStream,
    ) -> Result<std::process::Stdio, ExecError> {
        match spec.disposition(stream).to_stdio() {
            Ok(stdio) => Ok(stdio),
            Err(source) => self.raise(ExecError::Descriptor {
                program: spec.get_program().display(),
                stream,
                source,
            }),
        }
    }
}

fn terminate(error: &ExecError) {
    let mut message = format!("fatal: {error}");
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    eprintln!("{message}");
    std::process::exit(FATAL_EXIT_CODE);
}

/// Quote each word for `sh` and join them with spaces
fn shell_command_line(path: &Path, spec: &ChildProcessSpec) -> String {
    std::iter::once(path.as_os_str())
        .chain(spec.get_args().iter().map(|arg| arg.as_os_str()))
        .map(|word| shell_quote(&word.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

#[cfg(unix)]
fn is_not_executable(error: &io::Error) -> bool {
    error.raw_os_error() == Some(nix::errno::Errno::ENOEXEC as i32)
}

#[cfg(not(unix))]
fn is_not_executable(_error: &io::Error) -> bool {
    false
}

#[cfg(unix)]
fn exit_code(program: &str, pid: u32, status: ExitStatus, broken_pipe: BrokenPipe) -> i32 {
    use nix::sys::signal::Signal;
    use std::os::unix::process::ExitStatusExt;

    if let Some(code) = status.code() {
        return code;
    }

    let signal = status.signal().unwrap_or_default();
    let known = Signal::try_from(signal).ok();
    let name = known.map(Signal::as_str).unwrap_or("unknown signal");
    if known == Some(Signal::SIGPIPE) && broken_pipe == BrokenPipe::Expected {
        debug!(pid, program, signal, "child died of {name} after its reader closed");
    } else {
        warn!(pid, program, signal, "child died of {name}");
    }
    128 + signal
}

#[cfg(not(unix))]
fn exit_code(program: &str, pid: u32, status: ExitStatus, _broken_pipe: BrokenPipe) -> i32 {
    status.code().unwrap_or_else(|| {
        warn!(pid, program, "child terminated abnormally");
        -1
    })
}
