// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for blob decoding.

use std::fmt;

use thiserror::Error;

/// Result type for blob decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// The ways in which an analysis blob can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// The input ended before a complete field could be read.
    TruncatedInput,
    /// A length or count disagrees with the data actually present.
    LengthMismatch,
    /// A byte with a fixed set of legal values held something else.
    BadMagic,
    /// The zlib stream could not be inflated.
    DecompressionFailed,
    /// Bytes remained after the last field.
    TrailingBytes,
    /// A label was not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TruncatedInput => "truncated input",
            Self::LengthMismatch => "length mismatch",
            Self::BadMagic => "bad magic",
            Self::DecompressionFailed => "decompression failed",
            Self::TrailingBytes => "trailing bytes",
            Self::InvalidUtf8 => "invalid UTF-8",
        };
        f.write_str(s)
    }
}

/// A blob failed to decode.
///
/// `offset` is relative to the buffer being parsed, which for the compressed
/// formats is the inflated payload rather than the stored blob.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub offset: usize,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// A beat grid could not be normalised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid beat grid: {0}")]
pub struct InvalidBeatgrid(pub String);
