// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Header validation and projection into the typed catalog.
//!
//! The decoded header is a generic JSON tree. The validator walks it once,
//! projects each entry into a [`TensorDescriptor`] or the [`Metadata`] map,
//! checks every descriptor against the data region, and stops at the first
//! structural violation.

use crate::catalog::{FileStats, Metadata, ParseWarning, ParsedFile, TensorInfo};
use crate::locator::{json_kind, LocatedHeader};
use crate::{InspectConfig, ParseError, UnknownDTypePolicy};
use serde_json::{Map, Value};
use tensor_core::{DType, Shape};

/// Reserved key holding free-form string metadata.
pub const METADATA_KEY: &str = "__metadata__";

const DESCRIPTOR_FIELDS: [&str; 3] = ["dtype", "shape", "data_offsets"];

/// One tensor entry, projected from JSON but not yet checked against the
/// data region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorDescriptor {
    pub dtype: DType,
    pub shape: Shape,
    pub data_offsets: [u64; 2],
}

impl TensorDescriptor {
    /// Projects a header value into a descriptor.
    ///
    /// The value must be an object with exactly `dtype`, `shape` and
    /// `data_offsets`; anything else is reported as
    /// [`ParseError::MalformedTensorDescriptor`] naming the field.
    pub fn from_value(name: &str, value: &Value) -> Result<Self, ParseError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ParseError::malformed(name, "descriptor"))?;

        let dtype = obj
            .get("dtype")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::malformed(name, "dtype"))?;

        let shape = obj
            .get("shape")
            .and_then(Value::as_array)
            .and_then(|dims| dims.iter().map(Value::as_u64).collect::<Option<Vec<u64>>>())
            .ok_or_else(|| ParseError::malformed(name, "shape"))?;

        let data_offsets = match obj
            .get("data_offsets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
        {
            Some([start, end]) => match (start.as_u64(), end.as_u64()) {
                (Some(start), Some(end)) => [start, end],
                _ => return Err(ParseError::malformed(name, "data_offsets")),
            },
            _ => return Err(ParseError::malformed(name, "data_offsets")),
        };

        if let Some(extra) = obj
            .keys()
            .find(|k| !DESCRIPTOR_FIELDS.contains(&k.as_str()))
        {
            return Err(ParseError::malformed(name, extra.as_str()));
        }

        Ok(Self {
            dtype: DType::from_token(dtype),
            shape: Shape::new(shape),
            data_offsets,
        })
    }
}

/// Validates a located header and builds the [`ParsedFile`].
pub struct HeaderValidator {
    unknown_dtype: UnknownDTypePolicy,
}

impl HeaderValidator {
    /// Creates a validator applying the dtype policy from `config`.
    pub fn new(config: &InspectConfig) -> Self {
        Self {
            unknown_dtype: config.unknown_dtype,
        }
    }

    /// Validates every entry and computes aggregate statistics.
    ///
    /// Traversal order is deterministic: `__metadata__` first wherever it
    /// appears, then tensors in header order.
    pub fn validate(&self, located: &LocatedHeader) -> Result<ParsedFile, ParseError> {
        let header = &located.header;
        let data_len = located.data_len;

        let metadata = header.get(METADATA_KEY).map(parse_metadata).transpose()?;

        let mut warnings = Vec::new();
        let mut tensors = Vec::with_capacity(header.len());
        for (name, value) in header.iter().filter(|(k, _)| k.as_str() != METADATA_KEY) {
            let tensor = self.check_tensor(name, value, data_len, &mut warnings)?;
            tracing::debug!("tensor: {}", tensor.summary());
            tensors.push(tensor);
        }

        let stats = compute_stats(&tensors, located)?;
        Ok(ParsedFile {
            metadata,
            tensors,
            stats,
            warnings,
        })
    }

    fn check_tensor(
        &self,
        name: &str,
        value: &Value,
        data_len: u64,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<TensorInfo, ParseError> {
        if name.is_empty() {
            return Err(ParseError::malformed(name, "name"));
        }

        let TensorDescriptor {
            dtype,
            shape,
            data_offsets: [start, end],
        } = TensorDescriptor::from_value(name, value)?;

        if let DType::Unknown(token) = &dtype {
            match self.unknown_dtype {
                UnknownDTypePolicy::Reject => {
                    return Err(ParseError::UnknownDType {
                        name: name.to_string(),
                        value: token.clone(),
                    });
                }
                UnknownDTypePolicy::Warn => {
                    tracing::warn!("tensor '{name}' has unknown dtype '{token}', size not checked");
                    warnings.push(ParseWarning::UnknownDType {
                        name: name.to_string(),
                        value: token.clone(),
                    });
                }
            }
        }

        let element_count = shape
            .num_elements()
            .ok_or_else(|| ParseError::overflow(name, "element count"))?;

        if start > end {
            return Err(ParseError::InvalidOffsetRange {
                name: name.to_string(),
                start,
                end,
            });
        }
        if end > data_len {
            return Err(ParseError::OffsetOutOfBounds {
                name: name.to_string(),
                end,
                data_len,
            });
        }

        let byte_size = end - start;
        if let Some(expected) = expected_byte_size(name, &dtype, &shape)? {
            if expected != byte_size {
                return Err(ParseError::SizeMismatch {
                    name: name.to_string(),
                    expected,
                    actual: byte_size,
                });
            }
        }

        Ok(TensorInfo {
            name: name.to_string(),
            dtype,
            shape,
            element_count,
            byte_size,
            data_offsets: [start, end],
        })
    }
}

/// Bytes a tensor must occupy, or `None` when the dtype width is unknown.
fn expected_byte_size(name: &str, dtype: &DType, shape: &Shape) -> Result<Option<u64>, ParseError> {
    if !dtype.is_known() {
        return Ok(None);
    }
    if let Some(bytes) = shape.size_bytes(dtype) {
        return Ok(Some(bytes));
    }
    // Known width but no whole-byte size: either a partial byte or overflow.
    match shape.size_bits(dtype) {
        Some(bits) => Err(ParseError::MisalignedTensor {
            name: name.to_string(),
            bits,
        }),
        None => Err(ParseError::overflow(name, "byte size")),
    }
}

fn parse_metadata(value: &Value) -> Result<Metadata, ParseError> {
    let obj: &Map<String, Value> = value.as_object().ok_or_else(|| {
        tracing::debug!("{METADATA_KEY} is {}, not an object", json_kind(value));
        ParseError::InvalidMetadataValue {
            key: METADATA_KEY.to_string(),
        }
    })?;

    let entries = obj
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k.clone(), s.clone())),
            _ => Err(ParseError::InvalidMetadataValue { key: k.clone() }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Metadata::from_entries(entries))
}

fn compute_stats(tensors: &[TensorInfo], located: &LocatedHeader) -> Result<FileStats, ParseError> {
    let mut total_parameters = 0u64;
    let mut total_tensor_bytes = 0u64;
    for t in tensors {
        total_parameters = total_parameters
            .checked_add(t.element_count)
            .ok_or_else(|| ParseError::overflow(&t.name, "total parameters"))?;
        total_tensor_bytes = total_tensor_bytes
            .checked_add(t.byte_size)
            .ok_or_else(|| ParseError::overflow(&t.name, "total tensor bytes"))?;
    }

    Ok(FileStats {
        header_byte_length: located.header_len,
        data_byte_length: located.data_len,
        total_file_length: located.total_len,
        tensor_count: tensors.len(),
        total_parameters,
        total_tensor_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn located(header: Value, data_len: u64) -> LocatedHeader {
        let header = match header {
            Value::Object(map) => map,
            other => panic!("test header must be an object, got {other}"),
        };
        LocatedHeader {
            header,
            header_len: 100,
            data_offset: 108,
            data_len,
            total_len: 108 + data_len,
        }
    }

    fn validate(header: Value, data_len: u64) -> Result<ParsedFile, ParseError> {
        HeaderValidator::new(&InspectConfig::default()).validate(&located(header, data_len))
    }

    #[test]
    fn test_parameter_counts() {
        let parsed = validate(
            json!({
                "a": {"dtype": "F32", "shape": [2, 3], "data_offsets": [0, 24]},
                "b": {"dtype": "F32", "shape": [10], "data_offsets": [24, 64]},
                "c": {"dtype": "F32", "shape": [], "data_offsets": [64, 68]},
            }),
            68,
        )
        .unwrap();

        let counts: Vec<u64> = parsed.tensors.iter().map(|t| t.element_count).collect();
        assert_eq!(counts, vec![6, 10, 1]);
        assert_eq!(parsed.stats.total_parameters, 17);
        assert_eq!(parsed.stats.tensor_count, 3);
        assert_eq!(parsed.stats.total_tensor_bytes, 68);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_metadata_processed_regardless_of_position() {
        let parsed = validate(
            json!({
                "w": {"dtype": "U8", "shape": [2], "data_offsets": [0, 2]},
                "__metadata__": {"format": "pt", "note": "hi"},
            }),
            2,
        )
        .unwrap();
        let meta = parsed.metadata.unwrap();
        assert_eq!(meta.get("format"), Some("pt"));
        assert_eq!(meta.len(), 2);
        assert_eq!(parsed.tensors.len(), 1);
    }

    #[test]
    fn test_metadata_failure_reported_before_tensor_failure() {
        let err = validate(
            json!({
                "w": {"dtype": "U8", "shape": [2], "data_offsets": [5, 1]},
                "__metadata__": {"ok": "yes", "layers": 30},
            }),
            2,
        )
        .unwrap_err();
        match err {
            ParseError::InvalidMetadataValue { key } => assert_eq!(key, "layers"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_metadata_must_be_object() {
        let err = validate(json!({"__metadata__": ["a"]}), 0).unwrap_err();
        match err {
            ParseError::InvalidMetadataValue { key } => assert_eq!(key, METADATA_KEY),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_metadata_only() {
        let parsed = validate(json!({"__metadata__": {"format": "pt"}}), 0).unwrap();
        assert!(parsed.tensors.is_empty());
        assert_eq!(parsed.stats.tensor_count, 0);
        assert_eq!(parsed.stats.total_parameters, 0);
        assert_eq!(parsed.metadata.unwrap().get("format"), Some("pt"));
    }

    #[test]
    fn test_no_metadata_is_none() {
        let parsed = validate(json!({}), 0).unwrap();
        assert!(parsed.metadata.is_none());
    }

    #[test]
    fn test_inverted_offsets() {
        let err = validate(
            json!({"w": {"dtype": "U8", "shape": [50], "data_offsets": [100, 50]}}),
            200,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidOffsetRange { start: 100, end: 50, .. }
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let err = validate(
            json!({"w": {"dtype": "U8", "shape": [8], "data_offsets": [0, 8]}}),
            4,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::OffsetOutOfBounds { end: 8, data_len: 4, .. }
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let err = validate(
            json!({"w": {"dtype": "F32", "shape": [2, 2], "data_offsets": [0, 20]}}),
            20,
        )
        .unwrap_err();
        match err {
            ParseError::SizeMismatch {
                name,
                expected,
                actual,
            } => {
                assert_eq!(name, "w");
                assert_eq!(expected, 16);
                assert_eq!(actual, 20);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_dtype_warns_and_skips_size_check() {
        let parsed = validate(
            json!({"w": {"dtype": "NEWTYPE9", "shape": [2, 2], "data_offsets": [0, 3]}}),
            3,
        )
        .unwrap();
        assert_eq!(parsed.tensors.len(), 1);
        assert_eq!(parsed.tensors[0].byte_size, 3);
        assert_eq!(parsed.tensors[0].element_count, 4);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::UnknownDType {
                name: "w".into(),
                value: "NEWTYPE9".into()
            }]
        );
    }

    #[test]
    fn test_unknown_dtype_still_bounds_checked() {
        let err = validate(
            json!({"w": {"dtype": "NEWTYPE9", "shape": [1], "data_offsets": [0, 9]}}),
            3,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::OffsetOutOfBounds { .. }));
    }

    #[test]
    fn test_unknown_dtype_rejected_when_strict() {
        let config = InspectConfig::default().strict();
        let err = HeaderValidator::new(&config)
            .validate(&located(
                json!({"w": {"dtype": "NEWTYPE9", "shape": [1], "data_offsets": [0, 1]}}),
                1,
            ))
            .unwrap_err();
        assert!(matches!(err, ParseError::UnknownDType { .. }));
    }

    #[test]
    fn test_zero_dimension() {
        let parsed = validate(
            json!({"empty": {"dtype": "F16", "shape": [0, 5], "data_offsets": [0, 0]}}),
            0,
        )
        .unwrap();
        assert_eq!(parsed.tensors[0].element_count, 0);
        assert_eq!(parsed.tensors[0].byte_size, 0);
    }

    #[test]
    fn test_sub_byte_dtype() {
        let parsed = validate(
            json!({"q": {"dtype": "F4", "shape": [4, 2], "data_offsets": [0, 4]}}),
            4,
        )
        .unwrap();
        assert_eq!(parsed.tensors[0].element_count, 8);

        let err = validate(
            json!({"q": {"dtype": "F4", "shape": [3], "data_offsets": [0, 2]}}),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::MisalignedTensor { bits: 12, .. }));
    }

    #[test]
    fn test_shape_overflow() {
        let err = validate(
            json!({"w": {"dtype": "U8", "shape": [u64::MAX, 3], "data_offsets": [0, 0]}}),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Overflow { .. }));
    }

    #[test]
    fn test_byte_size_overflow() {
        let half = u64::MAX / 2;
        let err = validate(
            json!({"w": {"dtype": "F32", "shape": [half], "data_offsets": [0, 0]}}),
            0,
        )
        .unwrap_err();
        match err {
            ParseError::Overflow { name, what } => {
                assert_eq!(name, "w");
                assert_eq!(what, "byte size");
            }
            other => panic!("expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_total_parameters_overflow() {
        let err = validate(
            json!({
                "a": {"dtype": "X", "shape": [u64::MAX], "data_offsets": [0, 0]},
                "b": {"dtype": "X", "shape": [2], "data_offsets": [0, 0]}
            }),
            0,
        )
        .unwrap_err();
        match err {
            ParseError::Overflow { name, what } => {
                assert_eq!(name, "b");
                assert_eq!(what, "total parameters");
            }
            other => panic!("expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_descriptor_fields() {
        let cases = [
            (json!({"w": 3}), "descriptor"),
            (json!({"w": {"shape": [1], "data_offsets": [0, 1]}}), "dtype"),
            (json!({"w": {"dtype": 4, "shape": [1], "data_offsets": [0, 1]}}), "dtype"),
            (json!({"w": {"dtype": "U8", "data_offsets": [0, 1]}}), "shape"),
            (json!({"w": {"dtype": "U8", "shape": [-1], "data_offsets": [0, 1]}}), "shape"),
            (json!({"w": {"dtype": "U8", "shape": [1.5], "data_offsets": [0, 1]}}), "shape"),
            (json!({"w": {"dtype": "U8", "shape": "1", "data_offsets": [0, 1]}}), "shape"),
            (json!({"w": {"dtype": "U8", "shape": [1]}}), "data_offsets"),
            (json!({"w": {"dtype": "U8", "shape": [1], "data_offsets": [0]}}), "data_offsets"),
            (json!({"w": {"dtype": "U8", "shape": [1], "data_offsets": [0, 1, 2]}}), "data_offsets"),
            (json!({"w": {"dtype": "U8", "shape": [1], "data_offsets": [0, -1]}}), "data_offsets"),
            (
                json!({"w": {"dtype": "U8", "shape": [1], "data_offsets": [0, 1], "extra": true}}),
                "extra",
            ),
        ];

        for (header, expected_field) in cases {
            match validate(header.clone(), 16).unwrap_err() {
                ParseError::MalformedTensorDescriptor { name, field } => {
                    assert_eq!(name, "w");
                    assert_eq!(field, expected_field, "header: {header}");
                }
                other => panic!("unexpected error for {header}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_tensor_name() {
        let err = validate(
            json!({"": {"dtype": "U8", "shape": [1], "data_offsets": [0, 1]}}),
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedTensorDescriptor { ref field, .. } if field == "name"
        ));
    }

    #[test]
    fn test_first_failure_wins() {
        let err = validate(
            json!({
                "first": {"dtype": "F32", "shape": [1], "data_offsets": [0, 8]},
                "second": {"dtype": "F32", "shape": [1], "data_offsets": [9, 1]},
            }),
            16,
        )
        .unwrap_err();
        assert_eq!(err.tensor_name(), Some("first"));
    }

    #[test]
    fn test_tensor_order_follows_header() {
        let parsed = validate(
            json!({
                "zeta": {"dtype": "U8", "shape": [1], "data_offsets": [0, 1]},
                "alpha": {"dtype": "U8", "shape": [1], "data_offsets": [1, 2]},
                "mid": {"dtype": "U8", "shape": [1], "data_offsets": [2, 3]},
            }),
            3,
        )
        .unwrap();
        let names: Vec<&str> = parsed.tensors.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_descriptor_projection() {
        let d = TensorDescriptor::from_value(
            "x",
            &json!({"dtype": "BF16", "shape": [3, 1], "data_offsets": [2, 8]}),
        )
        .unwrap();
        assert_eq!(d.dtype, DType::BF16);
        assert_eq!(d.shape.dims(), &[3, 1]);
        assert_eq!(d.data_offsets, [2, 8]);
    }
}
