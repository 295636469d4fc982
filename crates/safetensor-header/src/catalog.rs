// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The normalized result of a parse: metadata, tensor catalog, statistics.

use serde::ser::SerializeMap;
use std::fmt;
use tensor_core::{DType, Shape};

/// Free-form string metadata from the `__metadata__` entry.
///
/// Entries keep the order they had in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub(crate) fn from_entries(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Looks up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates `(key, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl serde::Serialize for Metadata {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A validated tensor entry from the header.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TensorInfo {
    /// Tensor name (key in the header). Non-empty and unique.
    pub name: String,
    /// Element type.
    pub dtype: DType,
    /// Declared shape.
    pub shape: Shape,
    /// Product of the shape (1 for scalars, 0 if any dimension is 0).
    pub element_count: u64,
    /// Length of the declared byte range.
    pub byte_size: u64,
    /// `[start, end)` relative to the start of the data region.
    pub data_offsets: [u64; 2],
}

impl TensorInfo {
    /// Returns a one-line summary string for logging.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} ({} elements, {} bytes @ {}..{})",
            self.name,
            self.dtype,
            self.shape,
            self.element_count,
            self.byte_size,
            self.data_offsets[0],
            self.data_offsets[1],
        )
    }
}

/// Whole-file aggregate statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FileStats {
    /// Declared header length `N` (excluding the 8-byte prefix).
    pub header_byte_length: u64,
    /// Bytes after the header.
    pub data_byte_length: u64,
    /// Total size of the byte source.
    pub total_file_length: u64,
    /// Number of tensor entries.
    pub tensor_count: usize,
    /// Sum of element counts over all tensors.
    pub total_parameters: u64,
    /// Sum of byte sizes over all tensors.
    pub total_tensor_bytes: u64,
}

/// Non-fatal findings accumulated during a parse.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A dtype token outside the recognised set; its size was not checked.
    #[serde(rename = "unknown_dtype")]
    UnknownDType { name: String, value: String },
    /// Two tensors claim some of the same bytes.
    OverlappingTensors { first: String, second: String },
    /// Bytes of the data region that no tensor covers.
    UncoveredBytes { count: u64 },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::UnknownDType { name, value } => {
                write!(f, "tensor '{name}' has unknown dtype '{value}' (size not checked)")
            }
            ParseWarning::OverlappingTensors { first, second } => {
                write!(f, "tensors '{first}' and '{second}' have overlapping byte ranges")
            }
            ParseWarning::UncoveredBytes { count } => {
                write!(f, "{count} bytes of the data region are not covered by any tensor")
            }
        }
    }
}

/// Everything extracted from one SafeTensors file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParsedFile {
    /// Contents of `__metadata__`, if the header has one.
    pub metadata: Option<Metadata>,
    /// Tensors in traversal order (header order).
    pub tensors: Vec<TensorInfo>,
    /// Aggregate statistics.
    pub stats: FileStats,
    /// Soft findings; empty for a clean file.
    pub warnings: Vec<ParseWarning>,
}

impl ParsedFile {
    /// Finds a tensor by name.
    pub fn tensor(&self, name: &str) -> Option<&TensorInfo> {
        self.tensors.iter().find(|t| t.name == name)
    }

    /// Returns a one-line summary of the file.
    pub fn summary(&self) -> String {
        format!(
            "{} tensors, {} parameters, header {} bytes, data {} bytes, {} warnings",
            self.stats.tensor_count,
            self.stats.total_parameters,
            self.stats.header_byte_length,
            self.stats.data_byte_length,
            self.warnings.len(),
        )
    }
}
