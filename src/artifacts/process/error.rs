use std::fmt;
use std::io;

/// One of the three standard streams of a child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    Stdin,
    Stdout,
    Stderr,
}

impl fmt::Display for StdStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StdStream::Stdin => "stdin",
            StdStream::Stdout => "stdout",
            StdStream::Stderr => "stderr",
        })
    }
}

/// Failures of the execution engine
///
/// Every variant is fatal to the command being run: the executor hands it to
/// its fatal handler before returning it.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("`{operation}` cannot manage a provisioned {stream}")]
    ProvisionedStream {
        operation: &'static str,
        stream: StdStream,
    },
    #[error("cannot find executable `{0}` in PATH")]
    ProgramNotFound(String),
    #[error("cannot create pipe")]
    Pipe(#[source] io::Error),
    #[error("cannot duplicate {stream} descriptor for `{program}`")]
    Descriptor {
        program: String,
        stream: StdStream,
        #[source]
        source: io::Error,
    },
    #[error("cannot start `{program}`")]
    Start {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot wait for `{program}` (pid {pid})")]
    Wait {
        program: String,
        pid: u32,
        #[source]
        source: io::Error,
    },
    #[error("cannot read output of `{program}`")]
    Read {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    /// Whether the error is a caller contract violation rather than an environment failure
    pub fn is_programming_error(&self) -> bool {
        matches!(self, ExecError::ProvisionedStream { .. })
    }
}
