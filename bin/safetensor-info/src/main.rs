// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # safetensor-info
//!
//! Command-line interface for inspecting `.safetensors` files.
//!
//! ## Usage
//! ```bash
//! # Full report
//! safetensor-info model.safetensors
//!
//! # Machine-readable output
//! safetensor-info model.safetensors --format json
//!
//! # Only the __metadata__ section
//! safetensor-info model.safetensors --metadata-only
//!
//! # Only the tensor catalog, as JSON
//! safetensor-info model.safetensors --tensors-only --format json
//! ```

mod commands;

use clap::Parser;
use commands::{OutputFormat, View};

#[derive(Parser)]
#[command(
    name = "safetensor-info",
    about = "Read and display metadata from .safetensors files",
    version,
    author
)]
struct Cli {
    /// Path to the safetensors file.
    file: std::path::PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Show only metadata information.
    #[arg(long, conflicts_with = "tensors_only")]
    metadata_only: bool,

    /// Show only tensor information.
    #[arg(long)]
    tensors_only: bool,

    /// Path to a TOML parser configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Treat unrecognised dtypes as errors instead of warnings.
    #[arg(long)]
    strict_dtypes: bool,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let view = if cli.metadata_only {
        View::MetadataOnly
    } else if cli.tensors_only {
        View::TensorsOnly
    } else {
        View::Full
    };

    let config = commands::load_config(cli.config.as_deref(), cli.strict_dtypes)?;
    commands::inspect::execute(&cli.file, &config, cli.format, view)
}
