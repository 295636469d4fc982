// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Data-region layout audit.
//!
//! Well-formed writers lay tensors out back to back with no gaps. Files that
//! break this still parse, but the findings are reported as warnings.

use crate::catalog::{ParseWarning, TensorInfo};

/// Checks how the tensors tile a data region of `data_len` bytes.
///
/// Ranges are visited in order of start offset. A tensor that starts
/// before the farthest end seen so far overlaps the tensor owning that end.
/// Zero-length tensors occupy nothing and never overlap.
pub fn audit(tensors: &[TensorInfo], data_len: u64) -> Vec<ParseWarning> {
    let mut ranges: Vec<(u64, u64, &str)> = tensors
        .iter()
        .filter(|t| t.byte_size > 0)
        .map(|t| (t.data_offsets[0], t.data_offsets[1], t.name.as_str()))
        .collect();
    ranges.sort_unstable();

    let mut warnings = Vec::new();
    let mut covered = 0u64;
    let mut reach = 0u64;
    let mut owner: Option<&str> = None;

    for (start, end, name) in ranges {
        if let Some(first) = owner.filter(|_| start < reach) {
            tracing::warn!("tensors '{first}' and '{name}' overlap");
            warnings.push(ParseWarning::OverlappingTensors {
                first: first.to_string(),
                second: name.to_string(),
            });
        }
        if end > reach {
            covered += end - start.max(reach);
            reach = end;
            owner = Some(name);
        }
    }

    let uncovered = data_len.saturating_sub(covered);
    if uncovered > 0 {
        tracing::warn!("{uncovered} of {data_len} data bytes are not covered by any tensor");
        warnings.push(ParseWarning::UncoveredBytes { count: uncovered });
    }

    warnings
}
