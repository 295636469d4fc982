// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Command implementations and shared CLI plumbing.

pub mod inspect;
pub mod render;

use anyhow::Context;
use safetensor_header::InspectConfig;
use std::path::Path;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Which parts of the report to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Full,
    MetadataOnly,
    TensorsOnly,
}

/// Initialises `tracing` on stderr.
///
/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the parser configuration, defaulting when no file is given.
pub fn load_config(path: Option<&Path>, strict_dtypes: bool) -> anyhow::Result<InspectConfig> {
    let config = match path {
        Some(p) => InspectConfig::from_file(p)
            .with_context(|| format!("failed to load config from '{}'", p.display()))?,
        None => InspectConfig::default(),
    };
    tracing::debug!("parser config: {config:?}");

    Ok(if strict_dtypes { config.strict() } else { config })
}
