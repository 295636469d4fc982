// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Text and JSON rendering of a parsed file.

use super::View;
use safetensor_header::{ParsedFile, TensorInfo};
use serde_json::{json, Map, Value};

/// Formats a byte count with binary units and one decimal, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} PB")
}

/// Formats a count with comma thousands separators, e.g. `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Renders the human-readable report.
pub fn text(path: &str, parsed: &ParsedFile, view: View) -> String {
    let mut lines = Vec::new();

    match view {
        View::MetadataOnly => {
            if parsed.metadata.as_ref().is_some_and(|m| !m.is_empty()) {
                lines.push("=== METADATA ===".to_string());
                metadata_lines(parsed, &mut lines);
            } else {
                lines.push("No metadata found".to_string());
            }
        }
        View::TensorsOnly => {
            lines.push("=== TENSORS ===".to_string());
            for t in &parsed.tensors {
                tensor_lines(t, &mut lines);
            }
        }
        View::Full => {
            let stats = &parsed.stats;
            lines.push(format!("SafeTensor File: {path}"));
            lines.push(format!(
                "File Size: {} ({} bytes)",
                format_bytes(stats.total_file_length),
                format_count(stats.total_file_length),
            ));
            lines.push(format!("Tensor Count: {}", stats.tensor_count));
            lines.push(format!(
                "Total Parameters: {}",
                format_count(stats.total_parameters)
            ));
            lines.push(String::new());

            lines.push("=== METADATA ===".to_string());
            if parsed.metadata.as_ref().is_some_and(|m| !m.is_empty()) {
                metadata_lines(parsed, &mut lines);
            } else {
                lines.push("No metadata found".to_string());
            }
            lines.push(String::new());

            if !parsed.tensors.is_empty() {
                lines.push("=== TENSORS ===".to_string());
                for t in &parsed.tensors {
                    tensor_lines(t, &mut lines);
                }
            }
        }
    }

    if view != View::MetadataOnly && !parsed.warnings.is_empty() {
        lines.push("=== WARNINGS ===".to_string());
        for w in &parsed.warnings {
            lines.push(format!("- {w}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn metadata_lines(parsed: &ParsedFile, lines: &mut Vec<String>) {
    for (key, value) in parsed.metadata.iter().flat_map(|m| m.iter()) {
        lines.push(format!("{key}: {value}"));
    }
}

fn tensor_lines(t: &TensorInfo, lines: &mut Vec<String>) {
    lines.push(format!("{}:", t.name));
    lines.push(format!("  Shape: [{}]", t.shape.join("×")));
    lines.push(format!("  Dtype: {}", t.dtype));
    lines.push(format!("  Parameters: {}", format_count(t.element_count)));
    lines.push(format!("  Size: {}", format_bytes(t.byte_size)));
    lines.push(String::new());
}

/// Builds the machine-readable report.
pub fn json(path: &str, parsed: &ParsedFile, view: View) -> Value {
    let stats = &parsed.stats;
    let mut out = Map::new();
    out.insert("file_path".into(), json!(path));

    let with_summary = view == View::Full;
    let with_metadata = view != View::TensorsOnly;
    let with_tensors = view != View::MetadataOnly;

    if with_summary {
        out.insert("file_size".into(), json!(stats.total_file_length));
    }
    if with_metadata {
        out.insert("metadata".into(), json!(parsed.metadata));
    }
    if with_tensors {
        let tensors: Map<String, Value> = parsed
            .tensors
            .iter()
            .map(|t| {
                let entry = json!({
                    "shape": t.shape,
                    "dtype": t.dtype,
                    "parameters": t.element_count,
                    "size_bytes": t.byte_size,
                    "data_offsets": t.data_offsets,
                });
                (t.name.clone(), entry)
            })
            .collect();
        out.insert("tensors".into(), Value::Object(tensors));
        out.insert("tensor_count".into(), json!(stats.tensor_count));
        out.insert("total_parameters".into(), json!(stats.total_parameters));
        out.insert("warnings".into(), json!(parsed.warnings));
    }
    if with_summary {
        out.insert(
            "file_size_human".into(),
            json!(format_bytes(stats.total_file_length)),
        );
    }
    if with_tensors {
        out.insert(
            "total_parameters_human".into(),
            json!(format_count(stats.total_parameters)),
        );
    }

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParsedFile {
        let header = r#"{"__metadata__":{"format":"pt"},"embed":{"dtype":"F32","shape":[2,3],"data_offsets":[0,24]},"bias":{"dtype":"F16","shape":[10],"data_offsets":[24,44]}}"#;
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0u8; 44]);
        safetensor_header::parse(&bytes).unwrap()
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.0 B");
        assert_eq!(format_bytes(1023), "1023.0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(1024u64.pow(5)), "1.0 PB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_text_full() {
        let out = text("m.safetensors", &sample(), View::Full);
        assert!(out.starts_with("SafeTensor File: m.safetensors\n"));
        assert!(out.contains("Tensor Count: 2"));
        assert!(out.contains("Total Parameters: 16"));
        assert!(out.contains("=== METADATA ===\nformat: pt"));
        assert!(out.contains("embed:\n  Shape: [2×3]\n  Dtype: F32\n  Parameters: 6\n  Size: 24.0 B"));
        assert!(!out.contains("WARNINGS"));
    }

    #[test]
    fn test_text_metadata_only() {
        let out = text("m.safetensors", &sample(), View::MetadataOnly);
        assert_eq!(out, "=== METADATA ===\nformat: pt");
    }

    #[test]
    fn test_text_tensors_only() {
        let out = text("m.safetensors", &sample(), View::TensorsOnly);
        assert!(out.starts_with("=== TENSORS ===\nembed:"));
        assert!(!out.contains("METADATA"));
        assert!(out.contains("bias:\n  Shape: [10]"));
    }

    #[test]
    fn test_json_full_key_order() {
        let v = json("m.safetensors", &sample(), View::Full);
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "file_path",
                "file_size",
                "metadata",
                "tensors",
                "tensor_count",
                "total_parameters",
                "warnings",
                "file_size_human",
                "total_parameters_human",
            ]
        );
        assert_eq!(v["tensors"]["embed"]["shape"], json!([2, 3]));
        assert_eq!(v["tensors"]["embed"]["dtype"], "F32");
        assert_eq!(v["tensors"]["bias"]["size_bytes"], 20);
        assert_eq!(v["metadata"]["format"], "pt");
    }

    #[test]
    fn test_json_filtered_views() {
        let v = json("m.safetensors", &sample(), View::MetadataOnly);
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("metadata"));

        let v = json("m.safetensors", &sample(), View::TensorsOnly);
        let obj = v.as_object().unwrap();
        assert!(obj.contains_key("tensors"));
        assert!(!obj.contains_key("metadata"));
        assert_eq!(obj["total_parameters"], 16);
    }
}
