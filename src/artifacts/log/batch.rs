//! Framing of batch object dump output
//!
//! The batch dumper answers each identifier on its input with:
//!
//! ```text
//! <delimiter> <40-hex id> <type> <size>\n
//! <size bytes of object content>\n
//! ```
//!
//! The delimiter is 16 random hex digits chosen per traversal and passed to the
//! dumper in its format string. Record boundaries come from the declared size,
//! never from scanning content, so a commit message that contains a line shaped
//! like a summary line can neither end its record early nor spoof a new one.

use crate::artifacts::objects::object_id::{ObjectId, ObjectIdError};
use bytes::{Bytes, BytesMut};
use fake::rand;
use std::fmt;

/// Longest summary line accepted before a newline must have been seen
const MAX_SUMMARY_LINE: usize = 128;

const EXPECTED_TYPE: &[u8] = b"commit";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("summary line does not carry this traversal's delimiter: {0:?}")]
    DelimiterMismatch(String),
    #[error("malformed summary line: {0:?}")]
    MalformedSummary(String),
    #[error("invalid object id in summary line")]
    InvalidObjectId(#[from] ObjectIdError),
    #[error("object {oid} is a {kind}, expected commit")]
    UnexpectedType { oid: ObjectId, kind: String },
    #[error("object {oid} is not followed by a newline")]
    MissingTerminator { oid: ObjectId },
    #[error("{0} unparsed bytes at end of batch output")]
    TrailingBytes(usize),
}

/// Per-traversal token prefixed to every summary line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter(String);

impl Delimiter {
    pub fn new(token: impl Into<String>) -> Self {
        Delimiter(token.into())
    }

    /// 16 lowercase hex digits from the thread-local generator
    pub fn random() -> Self {
        Delimiter(format!("{:016x}", rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `--batch=<format>` argument for the batch object dumper
    pub fn batch_format(&self) -> String {
        format!(
            "--batch={} %(objectname) %(objecttype) %(objectsize)",
            self.0
        )
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One complete object pulled out of the batch stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchObject {
    pub oid: ObjectId,
    pub content: Bytes,
}

/// Incremental splitter of batch output into objects
///
/// Bytes are appended as they are read; complete objects are taken from the
/// front. An object whose content has not fully arrived stays buffered.
#[derive(Debug)]
pub struct BatchFramer {
    delimiter: Delimiter,
    buffer: BytesMut,
}

impl BatchFramer {
    pub fn new(delimiter: Delimiter) -> Self {
        BatchFramer {
            delimiter,
            buffer: BytesMut::new(),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete object from the buffer
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the buffer holds only part of an object
    pub fn next_object(&mut self) -> Result<Option<BatchObject>, ProtocolError> {
        let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') else {
            if self.buffer.len() > MAX_SUMMARY_LINE {
                return Err(ProtocolError::MalformedSummary(lossy(
                    &self.buffer[..MAX_SUMMARY_LINE],
                )));
            }
            return Ok(None);
        };

        let (oid, size) = self.parse_summary(&self.buffer[..line_end])?;
        let content_start = line_end + 1;
        let content_end = content_start
            .checked_add(size)
            .ok_or_else(|| ProtocolError::MalformedSummary(lossy(&self.buffer[..line_end])))?;

        if self.buffer.len() <= content_end {
            return Ok(None);
        }
        if self.buffer[content_end] != b'\n' {
            return Err(ProtocolError::MissingTerminator { oid });
        }

        let mut object = self.buffer.split_to(content_end + 1);
        object.truncate(content_end);
        let content = object.split_off(content_start).freeze();

        Ok(Some(BatchObject { oid, content }))
    }

    /// Check that the stream ended on an object boundary
    pub fn finish(&self) -> Result<(), ProtocolError> {
        match self.buffer.len() {
            0 => Ok(()),
            remaining => Err(ProtocolError::TrailingBytes(remaining)),
        }
    }

    fn parse_summary(&self, line: &[u8]) -> Result<(ObjectId, usize), ProtocolError> {
        let mut fields = line.split(|&b| b == b' ');

        if fields.next() != Some(self.delimiter.as_str().as_bytes()) {
            return Err(ProtocolError::DelimiterMismatch(lossy(line)));
        }

        let (Some(oid), Some(kind), Some(size), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(ProtocolError::MalformedSummary(lossy(line)));
        };

        let oid = ObjectId::from_hex_bytes(oid)?;
        if kind != EXPECTED_TYPE {
            return Err(ProtocolError::UnexpectedType {
                oid,
                kind: lossy(kind),
            });
        }

        let size = std::str::from_utf8(size)
            .ok()
            .filter(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| ProtocolError::MalformedSummary(lossy(line)))?;

        Ok((oid, size))
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
