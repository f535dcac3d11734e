//! Error taxonomy shared by every decoding stage.
//!
//! Structural errors abort the whole run; nothing here is recoverable
//! mid-parse.  The only soft failure in the crate, the end of a legacy
//! trailing table, is never surfaced as an `NmoError` at all.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NmoError {
    #[error("Truncated header: need 64 bytes, only {available} available")]
    TruncatedHeader { available: usize },

    /// Leading magic matches no known layout.  Callers fall back to the
    /// signature scanner on this error.
    #[error("Unsupported signature: {magic_hex}")]
    UnsupportedSignature { magic_hex: String },

    #[error("No container signature found anywhere in the input")]
    SignatureNotFound,

    #[error("File truncated: header and blocks declare {declared} B, file is {actual} B")]
    FileTruncated { declared: u64, actual: u64 },

    #[error("Decompression ended early: expected {expected} B, got {actual} B")]
    ShortDecompression { expected: usize, actual: usize },

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Component record {index}: truncated header")]
    TruncatedRecord { index: usize },

    #[error("Component record {index}: invalid name length {len}")]
    InvalidRecordLength { index: usize, len: i64 },

    #[error("Unterminated name at offset {offset:#x}")]
    UnterminatedName { offset: u64 },

    #[error("First record offset {first_offset:#x} precedes objects start {base:#x}")]
    InvalidLayout { first_offset: i64, base: i64 },

    #[error("Record {index}: offset {offset:#x} before objects base {base:#x}")]
    OffsetBeforeBase { index: usize, offset: i64, base: i64 },

    #[error("Record {index}: offsets not monotonic after sorting")]
    NonMonotonicOffsets { index: usize },

    #[error("Slice out of range: idx={index} start={start} size={size} (buffer {len} B)")]
    SliceOutOfRange { index: usize, start: u64, size: u64, len: u64 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, NmoError>;
