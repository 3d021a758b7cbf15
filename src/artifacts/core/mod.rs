//! Core utilities and shared types
//!
//! This module contains shared utilities used across the application.

use crate::artifacts::process::{ChildProcessSpec, Disposition, ExecError, Executor, ProcessHandle};
use std::io::{self, PipeWriter, Write};

/// Wrapper that implements `Write` over the standard input of an external pager
///
/// The pager command runs through `sh -c` so that values like `less -R` work.
/// `LESS` defaults to `FRX` when the environment does not set it. Once the
/// user quits the pager, further output is discarded.
///
/// ## Usage
///
/// ```ignore
/// let mut writer = PagerWriter::spawn(executor, "less")?;
/// writeln!(writer, "Some long output...")?;
/// writer.finish()?;
/// ```
pub struct PagerWriter {
    executor: Executor,
    stdin: Option<PipeWriter>,
    handle: Option<ProcessHandle>,
}

impl PagerWriter {
    pub fn spawn(executor: Executor, command: &str) -> Result<Self, ExecError> {
        let (reader, writer) = match io::pipe() {
            Ok(pipe) => pipe,
            Err(source) => return executor.raise(ExecError::Pipe(source)),
        };

        let mut spec = ChildProcessSpec::program("sh");
        spec.arg("-c")
            .arg(command)
            .stdin(Disposition::Provisioned(reader.into()));
        if std::env::var_os("LESS").is_none() {
            spec.env("LESS", "FRX");
        }

        let handle = executor.spawn(spec)?;
        Ok(PagerWriter {
            executor,
            stdin: Some(writer),
            handle: Some(handle),
        })
    }

    /// Close the pager's input and wait for the user to quit it
    pub fn finish(mut self) -> Result<i32, ExecError> {
        self.close()
    }

    fn close(&mut self) -> Result<i32, ExecError> {
        drop(self.stdin.take());
        match self.handle.take() {
            Some(handle) => self.executor.finish(handle),
            None => Ok(0),
        }
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(buf.len());
        };

        match stdin.write(buf) {
            Err(error) if error.kind() == io::ErrorKind::BrokenPipe => {
                self.stdin = None;
                Ok(buf.len())
            }
            result => result,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stdin.as_mut().map(Write::flush) {
            Some(Err(error)) if error.kind() == io::ErrorKind::BrokenPipe => {
                self.stdin = None;
                Ok(())
            }
            Some(result) => result,
            None => Ok(()),
        }
    }
}

impl Drop for PagerWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
