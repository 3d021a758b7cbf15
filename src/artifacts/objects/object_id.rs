//! Git object identifier (SHA-1 hash)
//!
//! Object IDs are 20 raw bytes, written as 40 lowercase hexadecimal characters.
//! They name every object the version-control engine stores (blobs, trees, commits).
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "abc123...def")
//! - Short: First 7 characters (e.g., "abc123f")
//!
//! Decoding accepts either case; encoding always produces lowercase.

use crate::artifacts::objects::{OBJECT_ID_HEX_LENGTH, OBJECT_ID_LENGTH};
use std::fmt;
use std::str::FromStr;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectIdError {
    #[error("invalid object ID length: {0}")]
    InvalidLength(usize),
    #[error("invalid object ID characters: {0}")]
    InvalidCharacters(String),
}

/// Git object identifier (SHA-1 hash)
///
/// A plain value type over the raw 20 bytes. Cheap to copy, immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LENGTH]);

impl ObjectId {
    /// Build an object ID directly from its raw bytes
    pub fn from_bytes(bytes: [u8; OBJECT_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse and validate an object ID from its hexadecimal text
    ///
    /// # Arguments
    ///
    /// * `hex` - exactly 40 hexadecimal characters, any case
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if the length or any character is invalid
    pub fn from_hex(hex: &str) -> Result<Self, ObjectIdError> {
        Self::from_hex_bytes(hex.as_bytes())
    }

    /// Same as [`ObjectId::from_hex`], for text that has not been checked for UTF-8
    pub fn from_hex_bytes(hex: &[u8]) -> Result<Self, ObjectIdError> {
        if hex.len() != OBJECT_ID_HEX_LENGTH {
            return Err(ObjectIdError::InvalidLength(hex.len()));
        }

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        for (byte, pair) in bytes.iter_mut().zip(hex.chunks_exact(2)) {
            match (nibble(pair[0]), nibble(pair[1])) {
                (Some(high), Some(low)) => *byte = (high << 4) | low,
                _ => {
                    return Err(ObjectIdError::InvalidCharacters(
                        String::from_utf8_lossy(hex).into_owned(),
                    ));
                }
            }
        }

        Ok(Self(bytes))
    }

    /// Encode as 40 lowercase hexadecimal characters
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OBJECT_ID_HEX_LENGTH);
        for byte in self.0 {
            hex.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            hex.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
        hex
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LENGTH] {
        &self.0
    }

    /// Get abbreviated form of the object ID
    ///
    /// # Returns
    ///
    /// First 7 characters of the hash (standard Git abbreviation)
    pub fn to_short_oid(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }
}

fn nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
