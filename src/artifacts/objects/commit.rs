//! Git commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A tree object ID (directory snapshot)
//! - Parent commit ID(s) (for history)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! Raw object content, as emitted by the batch object dumper:
//! ```text
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  ...
//!
//! <commit message>
//! ```
//!
//! Headers are read in that fixed order. Anything after the committer line and
//! before the first blank line (signatures, encodings, mergetags) is skipped.

use crate::artifacts::objects::object_id::{ObjectId, ObjectIdError};
use chrono::Offset;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitParseError {
    #[error("invalid commit object {oid}: missing tree line")]
    MissingTree { oid: ObjectId },
    #[error("invalid commit object {oid}: duplicate tree line")]
    DuplicateTree { oid: ObjectId },
    #[error("invalid commit object {oid}: invalid {header} id")]
    InvalidObjectId {
        oid: ObjectId,
        header: &'static str,
        #[source]
        source: ObjectIdError,
    },
    #[error("invalid commit object {oid}: missing {header} line")]
    MissingSignature { oid: ObjectId, header: &'static str },
    #[error("invalid commit object {oid}: malformed {header} line: {line}")]
    MalformedSignature {
        oid: ObjectId,
        header: &'static str,
        line: String,
    },
}

/// Seconds since the epoch and the timezone offset in minutes east of UTC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub time: i64,
    pub offset: i32,
}

impl Timestamp {
    /// Convert to a chrono datetime in the signer's own timezone
    ///
    /// Out-of-range values fall back to the epoch in UTC.
    pub fn to_datetime(self) -> chrono::DateTime<chrono::FixedOffset> {
        let offset = self
            .offset
            .checked_mul(60)
            .and_then(chrono::FixedOffset::east_opt)
            .unwrap_or(chrono::Utc.fix());
        chrono::DateTime::from_timestamp(self.time, 0)
            .unwrap_or_default()
            .with_timezone(&offset)
    }
}

/// Author or committer information
///
/// Name and email may be empty. Unparsable timestamp fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: Timestamp,
}

impl Signature {
    /// Format author name and email for display
    ///
    /// # Returns
    ///
    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Format timestamp in human-readable form
    ///
    /// # Returns
    ///
    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .to_datetime()
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    /// Parse the value of an `author`/`committer` header
    ///
    /// Format: `name <email> seconds offset`. The email brackets are mandatory
    /// and must not nest; both timestamp fields are optional.
    fn parse(value: &[u8]) -> Option<Self> {
        let open = value.iter().position(|&b| b == b'<')?;
        let close = open + 1 + value[open + 1..].iter().position(|&b| b == b'>')?;
        if value[open + 1..close].contains(&b'<') {
            return None;
        }

        let name = String::from_utf8_lossy(value[..open].trim_ascii()).into_owned();
        let email = String::from_utf8_lossy(&value[open + 1..close]).into_owned();

        let rest = String::from_utf8_lossy(&value[close + 1..]);
        let mut fields = rest.split_ascii_whitespace();
        let time = fields
            .next()
            .and_then(|seconds| seconds.parse::<i64>().ok())
            .unwrap_or(0);
        let offset = fields.next().map(parse_offset).unwrap_or(0);

        Some(Signature {
            name,
            email,
            timestamp: Timestamp { time, offset },
        })
    }
}

/// Reinterpret a `+HHMM` / `-HHMM` offset as signed total minutes
fn parse_offset(raw: &str) -> i32 {
    let Ok(hhmm) = raw.parse::<i32>() else {
        return 0;
    };
    let hhmm_abs = hhmm.unsigned_abs();
    let minutes = ((hhmm_abs / 100) * 60 + hhmm_abs % 100) as i32;
    if hhmm < 0 { -minutes } else { minutes }
}

/// A commit as delivered to traversal callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub oid: ObjectId,
    pub tree: ObjectId,
    /// Parent commit IDs in header order (empty for a root commit)
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Message with surrounding whitespace trimmed
    pub body: String,
}

impl CommitRecord {
    /// Parse the raw content of a commit object
    ///
    /// # Arguments
    ///
    /// * `oid` - Identifier the content was stored under
    /// * `raw` - Object content, without the batch summary line
    pub fn parse(oid: ObjectId, raw: &[u8]) -> Result<Self, CommitParseError> {
        let mut headers = HeaderLines::new(raw);

        let tree = match headers.next_with("tree ") {
            Some(value) => parse_oid(oid, "tree", value)?,
            None => return Err(CommitParseError::MissingTree { oid }),
        };

        let mut parents = Vec::new();
        while let Some(value) = headers.next_with("parent ") {
            parents.push(parse_oid(oid, "parent", value)?);
        }

        if headers.next_with("tree ").is_some() {
            return Err(CommitParseError::DuplicateTree { oid });
        }

        let author = parse_signature(oid, "author", &mut headers)?;
        let committer = parse_signature(oid, "committer", &mut headers)?;

        // unknown headers (gpgsig and its continuation lines, encoding, ...)
        let body = headers.skip_to_body();

        Ok(CommitRecord {
            oid,
            tree,
            parents,
            author,
            committer,
            body: String::from_utf8_lossy(body.trim_ascii()).into_owned(),
        })
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> &str {
        self.body.lines().next().unwrap_or("")
    }
}

fn parse_oid(
    oid: ObjectId,
    header: &'static str,
    value: &[u8],
) -> Result<ObjectId, CommitParseError> {
    ObjectId::from_hex_bytes(value).map_err(|source| CommitParseError::InvalidObjectId {
        oid,
        header,
        source,
    })
}

/// Parse one signature header, discarding any immediate repeats of it
fn parse_signature(
    oid: ObjectId,
    header: &'static str,
    headers: &mut HeaderLines<'_>,
) -> Result<Signature, CommitParseError> {
    let prefix = format!("{header} ");

    let value = headers
        .next_with(&prefix)
        .ok_or(CommitParseError::MissingSignature { oid, header })?;
    let signature =
        Signature::parse(value).ok_or_else(|| CommitParseError::MalformedSignature {
            oid,
            header,
            line: String::from_utf8_lossy(value).into_owned(),
        })?;

    while headers.next_with(&prefix).is_some() {}

    Ok(signature)
}

/// Cursor over the header section of a raw commit
struct HeaderLines<'a> {
    rest: &'a [u8],
}

impl<'a> HeaderLines<'a> {
    fn new(raw: &'a [u8]) -> Self {
        HeaderLines { rest: raw }
    }

    fn peek_line(&self) -> (&'a [u8], &'a [u8]) {
        match self.rest.iter().position(|&b| b == b'\n') {
            Some(end) => (&self.rest[..end], &self.rest[end + 1..]),
            None => (self.rest, &[]),
        }
    }

    /// Consume the next line if it starts with `prefix`, returning the value after it
    fn next_with(&mut self, prefix: &str) -> Option<&'a [u8]> {
        let (line, rest) = self.peek_line();
        let value = line.strip_prefix(prefix.as_bytes())?;
        self.rest = rest;
        Some(value)
    }

    /// Skip to the line after the first blank line and return everything from there
    fn skip_to_body(mut self) -> &'a [u8] {
        while !self.rest.is_empty() {
            let (line, rest) = self.peek_line();
            self.rest = rest;
            if line.is_empty() {
                break;
            }
        }
        self.rest
    }
}
