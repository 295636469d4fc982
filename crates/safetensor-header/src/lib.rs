// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # safetensor-header
//!
//! Reads and validates the header of a SafeTensors file without touching the
//! tensor data.
//!
//! - [`HeaderLocator`]: reads the 8-byte length prefix and decodes the JSON
//!   header that follows it.
//! - [`HeaderValidator`]: projects the header into typed
//!   [`TensorInfo`]s and [`Metadata`], checking every descriptor against
//!   the data region.
//! - [`layout::audit`]: reports overlapping tensors and unused data bytes.
//! - [`InspectConfig`]: policy knobs, loadable from TOML.
//!
//! Parsing is a pure function of the input bytes: no global state, no
//! caches, and no file handle outlives the call.
//!
//! # Example
//! ```
//! let header = br#"{"w":{"dtype":"F32","shape":[2],"data_offsets":[0,8]}}"#;
//! let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
//! bytes.extend_from_slice(header);
//! bytes.extend_from_slice(&[0u8; 8]);
//!
//! let parsed = safetensor_header::parse(&bytes).unwrap();
//! assert_eq!(parsed.stats.total_parameters, 2);
//! assert_eq!(parsed.tensors[0].name, "w");
//! ```

mod catalog;
mod config;
mod error;
pub mod layout;
mod locator;
mod validator;

pub use catalog::{FileStats, Metadata, ParseWarning, ParsedFile, TensorInfo};
pub use config::{InspectConfig, UnknownDTypePolicy, DEFAULT_MAX_HEADER_BYTES};
pub use error::ParseError;
pub use locator::{HeaderLocator, LocatedHeader, LENGTH_PREFIX_BYTES};
pub use tensor_core::{DType, Shape};
pub use validator::{HeaderValidator, TensorDescriptor, METADATA_KEY};

use std::io::{Read, Seek};
use std::path::Path;

/// Parses an in-memory SafeTensors file with the default configuration.
pub fn parse(bytes: &[u8]) -> Result<ParsedFile, ParseError> {
    parse_with(bytes, &InspectConfig::default())
}

/// Parses an in-memory SafeTensors file.
pub fn parse_with(bytes: &[u8], config: &InspectConfig) -> Result<ParsedFile, ParseError> {
    let located = HeaderLocator::new(config).locate(bytes)?;
    model(&located, config)
}

/// Parses a SafeTensors file through a seekable reader, reading only the
/// prefix and header.
pub fn parse_reader<R: Read + Seek>(
    reader: &mut R,
    config: &InspectConfig,
) -> Result<ParsedFile, ParseError> {
    let located = HeaderLocator::new(config).locate_reader(reader)?;
    model(&located, config)
}

/// Parses a SafeTensors file on disk.
///
/// The file is memory-mapped for the duration of the call; the mapping and
/// the handle are dropped before returning, on success and on error.
pub fn parse_file(path: &Path, config: &InspectConfig) -> Result<ParsedFile, ParseError> {
    let file = std::fs::File::open(path)?;
    let len = file.metadata()?.len();
    tracing::debug!("parsing '{}' ({len} bytes)", path.display());

    // Mapping an empty file fails on some platforms; there is nothing to
    // map anyway.
    if len == 0 {
        return parse_with(&[], config);
    }

    // SAFETY: the mapping is read-only and lives only inside this call.
    // Concurrent truncation of the file by another process is outside what
    // this tool can guard against.
    let mmap = unsafe { memmap2::Mmap::map(&file) }?;
    parse_with(&mmap, config)
}

fn model(located: &LocatedHeader, config: &InspectConfig) -> Result<ParsedFile, ParseError> {
    let mut parsed = HeaderValidator::new(config).validate(located)?;
    if config.audit_layout {
        let findings = layout::audit(&parsed.tensors, located.data_len);
        parsed.warnings.extend(findings);
    }
    tracing::debug!("{}", parsed.summary());
    Ok(parsed)
}
