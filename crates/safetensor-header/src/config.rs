// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Parser configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! unknown_dtype = "warn"        # or "reject"
//! max_header_bytes = 100000000
//! audit_layout = true
//! ```

use crate::ParseError;
use std::path::Path;

/// Largest header the reference SafeTensors implementation accepts.
pub const DEFAULT_MAX_HEADER_BYTES: u64 = 100_000_000;

/// What to do with a dtype token outside the recognised set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownDTypePolicy {
    /// Record a warning, skip the size check, keep going.
    #[default]
    Warn,
    /// Abort the parse with [`ParseError::UnknownDType`].
    Reject,
}

/// Configuration for header parsing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectConfig {
    /// Policy for unrecognised dtype tokens.
    #[serde(default)]
    pub unknown_dtype: UnknownDTypePolicy,
    /// Upper bound on the declared header length.
    #[serde(default = "default_max_header_bytes")]
    pub max_header_bytes: u64,
    /// Whether to report overlapping tensors and unused data bytes.
    #[serde(default = "default_true")]
    pub audit_layout: bool,
}

fn default_max_header_bytes() -> u64 {
    DEFAULT_MAX_HEADER_BYTES
}

fn default_true() -> bool {
    true
}

impl InspectConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ParseError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ParseError> {
        toml::from_str(toml_str)
            .map_err(|e| ParseError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ParseError> {
        toml::to_string_pretty(self)
            .map_err(|e| ParseError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Returns a copy with unknown dtypes treated as hard errors.
    pub fn strict(mut self) -> Self {
        self.unknown_dtype = UnknownDTypePolicy::Reject;
        self
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            unknown_dtype: UnknownDTypePolicy::Warn,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            audit_layout: true,
        }
    }
}
