// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Default command: parse one file and print the report.

use super::{render, OutputFormat, View};
use safetensor_header::InspectConfig;
use std::path::Path;

pub fn execute(
    file: &Path,
    config: &InspectConfig,
    format: OutputFormat,
    view: View,
) -> anyhow::Result<()> {
    let report = build_report(file, config, format, view)?;
    println!("{report}");
    Ok(())
}

/// Parses `file` and renders the report without printing it.
pub fn build_report(
    file: &Path,
    config: &InspectConfig,
    format: OutputFormat,
    view: View,
) -> anyhow::Result<String> {
    if !file.exists() {
        anyhow::bail!("File '{}' not found.", file.display());
    }
    if !file.is_file() {
        anyhow::bail!("'{}' is not a file.", file.display());
    }

    let parsed = safetensor_header::parse_file(file, config)
        .map_err(|e| anyhow::anyhow!("failed to read '{}': {e}", file.display()))?;
    tracing::info!("{}: {}", file.display(), parsed.summary());

    let path = file.display().to_string();
    let report = match format {
        OutputFormat::Text => render::text(&path, &parsed, view),
        OutputFormat::Json => serde_json::to_string_pretty(&render::json(&path, &parsed, view))?,
    };
    Ok(report)
}
