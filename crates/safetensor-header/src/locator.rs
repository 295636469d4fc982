// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Locating and decoding the length-prefixed JSON header.
//!
//! ```text
//! offset 0     : u64 LE  N = header length
//! offset 8     : N bytes of UTF-8 JSON (one object)
//! offset 8 + N : tensor data region
//! ```
//!
//! The locator never looks at the data region; it only needs its length.

use crate::{InspectConfig, ParseError};
use serde_json::{Map, Value};
use std::io::{Read, Seek, SeekFrom};

/// Size of the little-endian length prefix.
pub const LENGTH_PREFIX_BYTES: u64 = 8;

/// A decoded header plus the geometry of the file around it.
#[derive(Debug, Clone)]
pub struct LocatedHeader {
    /// The top-level header object, in source key order.
    pub header: Map<String, Value>,
    /// Declared header length `N`.
    pub header_len: u64,
    /// Absolute offset of the data region (`8 + N`).
    pub data_offset: u64,
    /// Bytes from `data_offset` to end of file.
    pub data_len: u64,
    /// Total length of the byte source.
    pub total_len: u64,
}

/// Finds the header in a byte source and decodes it.
///
/// # Example
/// ```
/// use safetensor_header::{HeaderLocator, InspectConfig};
///
/// let mut bytes = 2u64.to_le_bytes().to_vec();
/// bytes.extend_from_slice(b"{}");
/// let located = HeaderLocator::new(&InspectConfig::default()).locate(&bytes).unwrap();
/// assert_eq!(located.data_len, 0);
/// ```
pub struct HeaderLocator {
    max_header_bytes: u64,
}

impl HeaderLocator {
    /// Creates a locator enforcing the header ceiling from `config`.
    pub fn new(config: &InspectConfig) -> Self {
        Self {
            max_header_bytes: config.max_header_bytes,
        }
    }

    /// Locates the header in an in-memory (or memory-mapped) file.
    pub fn locate(&self, bytes: &[u8]) -> Result<LocatedHeader, ParseError> {
        let total_len = bytes.len() as u64;
        let prefix: [u8; 8] = bytes
            .get(..LENGTH_PREFIX_BYTES as usize)
            .and_then(|p| p.try_into().ok())
            .ok_or_else(|| short_prefix(total_len))?;

        let header_len = self.check_prefix(prefix, total_len)?;
        let start = LENGTH_PREFIX_BYTES as usize;
        // check_prefix guarantees 8 + N <= bytes.len().
        let header_bytes = &bytes[start..start + header_len as usize];

        self.finish(header_bytes, header_len, total_len)
    }

    /// Locates the header through a seekable reader.
    ///
    /// Reads the prefix and the header only; the data region is measured
    /// by seeking, never read.
    pub fn locate_reader<R: Read + Seek>(
        &self,
        reader: &mut R,
    ) -> Result<LocatedHeader, ParseError> {
        let total_len = reader.seek(SeekFrom::End(0))?;
        if total_len < LENGTH_PREFIX_BYTES {
            return Err(short_prefix(total_len));
        }
        reader.seek(SeekFrom::Start(0))?;

        let mut prefix = [0u8; 8];
        reader.read_exact(&mut prefix)?;
        let header_len = self.check_prefix(prefix, total_len)?;

        let len = usize::try_from(header_len).map_err(|_| ParseError::MalformedHeader {
            detail: format!("header length {header_len} exceeds the platform address space"),
        })?;
        let mut header_bytes = vec![0u8; len];
        reader.read_exact(&mut header_bytes)?;

        self.finish(&header_bytes, header_len, total_len)
    }

    /// Validates the declared header length against the file size and the
    /// configured ceiling. Returns `N`.
    fn check_prefix(&self, prefix: [u8; 8], total_len: u64) -> Result<u64, ParseError> {
        let header_len = u64::from_le_bytes(prefix);

        if header_len == 0 {
            return Err(ParseError::MalformedHeader {
                detail: "declared header length is 0".into(),
            });
        }
        if header_len > self.max_header_bytes {
            return Err(ParseError::MalformedHeader {
                detail: format!(
                    "declared header length {header_len} exceeds the limit of {} bytes",
                    self.max_header_bytes
                ),
            });
        }

        let available = total_len - LENGTH_PREFIX_BYTES;
        if header_len > available {
            return Err(ParseError::TruncatedFile {
                declared: header_len,
                available,
            });
        }

        Ok(header_len)
    }

    fn finish(
        &self,
        header_bytes: &[u8],
        header_len: u64,
        total_len: u64,
    ) -> Result<LocatedHeader, ParseError> {
        let header = decode_header(header_bytes)?;
        let data_offset = LENGTH_PREFIX_BYTES + header_len;
        let data_len = total_len - data_offset;

        tracing::debug!(
            "header: {header_len} bytes, {} entries; data region: {data_len} bytes at offset {data_offset}",
            header.len(),
        );

        Ok(LocatedHeader {
            header,
            header_len,
            data_offset,
            data_len,
            total_len,
        })
    }
}

fn short_prefix(total_len: u64) -> ParseError {
    ParseError::MalformedHeader {
        detail: format!(
            "file is {total_len} bytes, too short for the {LENGTH_PREFIX_BYTES}-byte length prefix"
        ),
    }
}

/// Decodes header bytes into a JSON object.
///
/// Error offsets are absolute file offsets (they include the length prefix).
fn decode_header(bytes: &[u8]) -> Result<Map<String, Value>, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidHeaderEncoding {
        offset: LENGTH_PREFIX_BYTES + e.valid_up_to() as u64,
        detail: format!("invalid UTF-8: {e}"),
    })?;

    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseError::InvalidHeaderEncoding {
            offset: LENGTH_PREFIX_BYTES + json_error_offset(text, &e),
            detail: e.to_string(),
        })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::InvalidHeaderEncoding {
            offset: LENGTH_PREFIX_BYTES,
            detail: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

/// Converts serde_json's 1-based line/column into a byte offset in `text`.
fn json_error_offset(text: &str, err: &serde_json::Error) -> u64 {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(err.line().saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + err.column().saturating_sub(1)) as u64
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
