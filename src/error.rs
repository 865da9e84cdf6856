//! Library-wide error and result types.

use std::io;

use thiserror::Error;

/// Result alias used throughout mfdedit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Corrupt access conditions and value-block warnings are not errors; they
/// are ordinary values in the decoded tables (see [`crate::codec`]).
#[derive(Debug, Error)]
pub enum Error {
    /// The dump is not 320, 1024 or 4096 bytes long.
    #[error("wrong file size: {0} bytes (only 320, 1024 or 4096 bytes allowed)")]
    InvalidSize(usize),
    /// A sector, block, nibble or bit position lies outside the card geometry.
    #[error("address outside card geometry")]
    InvalidAddress,
    /// A character that is not a hex digit (nibble edits) or `0`/`1`
    /// (access bit edits).
    #[error("invalid digit: {0:?}")]
    InvalidDigit(char),
    /// The target is derived from other fields and cannot be edited directly.
    #[error("field is read-only")]
    ReadOnly,
    /// The image was parsed from memory and has no file to save back to.
    #[error("no backing file")]
    NoPath,
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
