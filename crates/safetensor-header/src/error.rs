// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for header location and validation.

/// Hard failures that abort a parse.
///
/// Every variant carries enough context (a byte offset or a tensor name) to
/// point at the offending part of the file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The length prefix is missing, zero, or implausibly large.
    #[error("malformed header: {detail}")]
    MalformedHeader { detail: String },

    /// The declared header length runs past the end of the file.
    #[error("truncated file: header declares {declared} bytes but only {available} follow the length prefix")]
    TruncatedFile { declared: u64, available: u64 },

    /// The header bytes are not UTF-8, not JSON, or not a JSON object.
    #[error("invalid header encoding at byte {offset}: {detail}")]
    InvalidHeaderEncoding { offset: u64, detail: String },

    /// A `__metadata__` entry is not a string (or the sentinel itself is
    /// not an object).
    #[error("invalid metadata value for key '{key}': expected a string")]
    InvalidMetadataValue { key: String },

    /// A tensor entry is missing, mistyping, or adding a field.
    #[error("malformed descriptor for tensor '{name}': bad or missing field '{field}'")]
    MalformedTensorDescriptor { name: String, field: String },

    /// Unrecognised dtype token, only raised under the reject policy.
    #[error("tensor '{name}' has unknown dtype '{value}'")]
    UnknownDType { name: String, value: String },

    /// `data_offsets` has start after end.
    #[error("tensor '{name}' has inverted data_offsets [{start}, {end}]")]
    InvalidOffsetRange { name: String, start: u64, end: u64 },

    /// `data_offsets` ends beyond the data region.
    #[error("tensor '{name}' ends at byte {end} but the data region is only {data_len} bytes")]
    OffsetOutOfBounds { name: String, end: u64, data_len: u64 },

    /// Declared byte range disagrees with shape × dtype width.
    #[error("tensor '{name}' size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// A sub-byte dtype whose elements do not fill a whole number of bytes.
    #[error("tensor '{name}' occupies {bits} bits, which is not a whole number of bytes")]
    MisalignedTensor { name: String, bits: u64 },

    /// A derived count does not fit in 64 bits.
    #[error("overflow computing {what} for '{name}'")]
    Overflow { name: String, what: &'static str },

    /// The byte source could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The parser configuration could not be loaded.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ParseError {
    pub(crate) fn malformed(name: &str, field: impl Into<String>) -> Self {
        ParseError::MalformedTensorDescriptor {
            name: name.to_string(),
            field: field.into(),
        }
    }

    pub(crate) fn overflow(name: &str, what: &'static str) -> Self {
        ParseError::Overflow {
            name: name.to_string(),
            what,
        }
    }

    /// Returns the tensor name this error refers to, if any.
    pub fn tensor_name(&self) -> Option<&str> {
        match self {
            ParseError::MalformedTensorDescriptor { name, .. }
            | ParseError::UnknownDType { name, .. }
            | ParseError::InvalidOffsetRange { name, .. }
            | ParseError::OffsetOutOfBounds { name, .. }
            | ParseError::SizeMismatch { name, .. }
            | ParseError::MisalignedTensor { name, .. } => Some(name),
            _ => None,
        }
    }
}
