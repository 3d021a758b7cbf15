//! Streaming commit graph reader
//!
//! Two helpers are chained through a pipe this reader creates:
//!
//! ```text
//! git rev-list --first-parent --no-merges ... ──pipe──> git cat-file --batch=<delimiter> ...
//! ```
//!
//! The lister emits identifiers newest first; the dumper answers each with a
//! summary line and the raw commit. Output is read in fixed-size chunks and
//! every complete record is parsed and handed to the callback as soon as it is
//! buffered. Both helpers are reaped on every path out of the traversal.

use crate::artifacts::log::batch::{BatchFramer, Delimiter, ProtocolError};
use crate::artifacts::objects::commit::{CommitParseError, CommitRecord};
use crate::artifacts::process::{
    ChildProcessSpec, Disposition, ExecError, Executor, ProcessHandle,
};
use derive_new::new;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing::debug;

/// Bytes requested from the dumper's output per read
pub const READ_CHUNK_SIZE: usize = 8192;

const LISTER: &str = "rev-list";
const DUMPER: &str = "cat-file";

/// How a traversal that did not fail came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOutcome {
    /// Every listed commit was delivered (including when the limit was reached)
    Completed,
    /// The callback asked to stop
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("git {helper} exited with status {code}")]
    HelperExit { helper: &'static str, code: i32 },
    #[error("corrupt batch output: {0}")]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Parse(#[from] CommitParseError),
    #[error("traversal callback failed: {0:#}")]
    Callback(anyhow::Error),
}

/// A first-parent walk over non-merge commits
#[derive(Debug, Clone, new)]
pub struct RevList<'e> {
    executor: &'e Executor,
    /// Directory the helpers run in
    work_dir: PathBuf,
    /// Explicit commit to show; `None` walks from `HEAD`
    start: Option<String>,
    /// Maximum number of commits when walking from `HEAD`; `None` is unbounded
    limit: Option<NonZeroUsize>,
}

impl RevList<'_> {
    /// Arguments for the log lister
    ///
    /// An explicit start point shows exactly that commit and is never read as
    /// an option, even when it starts with `-`.
    pub fn lister_args(&self) -> Vec<String> {
        let mut args = vec![
            LISTER.to_string(),
            "--first-parent".to_string(),
            "--no-merges".to_string(),
        ];
        match (&self.start, self.limit) {
            (Some(start), _) => {
                args.push("--max-count=1".to_string());
                args.push("--end-of-options".to_string());
                args.push(start.clone());
            }
            (None, Some(limit)) => {
                args.push(format!("--max-count={limit}"));
                args.push("HEAD".to_string());
            }
            (None, None) => args.push("HEAD".to_string()),
        }
        args.push("--".to_string());
        args
    }

    /// Walk the history, calling `callback` for every commit in lister order
    ///
    /// # Returns
    ///
    /// `Completed` or `Stopped`; helper exits, corrupt output, parse failures
    /// and callback errors are errors. The walk stops at the first of them.
    pub fn traverse<F>(self, mut callback: F) -> Result<TraversalOutcome, TraversalError>
    where
        F: FnMut(&CommitRecord) -> anyhow::Result<ControlFlow<()>>,
    {
        let (link_reader, link_writer) = self.pipe()?;
        let (output_reader, output_writer) = self.pipe()?;
        let delimiter = Delimiter::random();

        let mut lister = ChildProcessSpec::git();
        lister
            .args(self.lister_args())
            .current_dir(&self.work_dir)
            .stdout(Disposition::Provisioned(link_writer.into()));

        let mut dumper = ChildProcessSpec::git();
        dumper
            .arg(DUMPER)
            .arg(delimiter.batch_format())
            .current_dir(&self.work_dir)
            .stdin(Disposition::Provisioned(link_reader.into()))
            .stdout(Disposition::Provisioned(output_writer.into()));

        let lister = self.executor.spawn(lister)?;
        let dumper = match self.executor.spawn(dumper) {
            Ok(dumper) => dumper,
            Err(error) => {
                self.reap(lister, false)?;
                return Err(error.into());
            }
        };

        let streamed = stream_records(output_reader, &delimiter, &mut callback);

        // anything short of a clean end-of-stream closed the dumper's output early
        let drained = matches!(streamed, Ok(TraversalOutcome::Completed));
        let lister_code = self.reap(lister, drained)?;
        let dumper_code = self.reap(dumper, drained)?;

        let outcome = match streamed {
            Err(StreamError::Read(source)) => {
                let error = ExecError::Read {
                    program: format!("git {DUMPER}"),
                    source,
                };
                return self.executor.raise(error).map_err(TraversalError::from);
            }
            Err(StreamError::Traversal(error)) => return Err(error),
            Ok(outcome) => outcome,
        };

        // an early stop closes the dumper's output, so its exit status says nothing
        if outcome == TraversalOutcome::Completed {
            for (helper, code) in [(LISTER, lister_code), (DUMPER, dumper_code)] {
                if code != 0 {
                    return Err(TraversalError::HelperExit { helper, code });
                }
            }
        }

        Ok(outcome)
    }

    fn pipe(&self) -> Result<(io::PipeReader, io::PipeWriter), ExecError> {
        match io::pipe() {
            Ok(pipe) => Ok(pipe),
            Err(source) => self.executor.raise(ExecError::Pipe(source)),
        }
    }

    fn reap(&self, handle: ProcessHandle, drained: bool) -> Result<i32, ExecError> {
        if drained {
            self.executor.finish(handle)
        } else {
            self.executor.finish_after_close(handle)
        }
    }
}

#[derive(Debug)]
enum StreamError {
    Read(io::Error),
    Traversal(TraversalError),
}

impl From<TraversalError> for StreamError {
    fn from(error: TraversalError) -> Self {
        StreamError::Traversal(error)
    }
}

impl From<ProtocolError> for StreamError {
    fn from(error: ProtocolError) -> Self {
        StreamError::Traversal(error.into())
    }
}

impl From<CommitParseError> for StreamError {
    fn from(error: CommitParseError) -> Self {
        StreamError::Traversal(error.into())
    }
}

/// Read batch output to end-of-stream, delivering records as they complete
///
/// `output` is dropped before returning, so an early stop closes the read end
/// of the dumper's pipe.
fn stream_records<R, F>(
    mut output: R,
    delimiter: &Delimiter,
    callback: &mut F,
) -> Result<TraversalOutcome, StreamError>
where
    R: Read,
    F: FnMut(&CommitRecord) -> anyhow::Result<ControlFlow<()>>,
{
    let mut framer = BatchFramer::new(delimiter.clone());
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut delivered = 0usize;

    loop {
        let read = match output.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(StreamError::Read(error)),
        };
        framer.extend(&chunk[..read]);

        while let Some(object) = framer.next_object()? {
            let record = CommitRecord::parse(object.oid, &object.content)?;
            delivered += 1;
            debug!(oid = %record.oid, delivered, "delivering commit");

            if callback(&record)
                .map_err(TraversalError::Callback)?
                .is_break()
            {
                debug!(delivered, "callback stopped traversal");
                return Ok(TraversalOutcome::Stopped);
            }
        }
    }

    framer.finish()?;
    debug!(delivered, "traversal completed");
    Ok(TraversalOutcome::Completed)
}
