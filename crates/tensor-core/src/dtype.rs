// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element data types recognised in SafeTensors headers.

use std::fmt;

/// Enumerates the element types a SafeTensors header can declare.
///
/// The set is closed, with a [`DType::Unknown`] fallback that keeps the raw
/// token around. Newer writers may emit tags this tool predates; those still
/// parse, they just have no known width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean, stored as one byte.
    Bool,
    /// 4-bit float (E2M1).
    F4,
    /// 6-bit float (E2M3).
    F6E2M3,
    /// 6-bit float (E3M2).
    F6E3M2,
    /// 8-bit unsigned integer.
    U8,
    /// 8-bit signed integer.
    I8,
    /// 8-bit float (E5M2).
    F8E5M2,
    /// 8-bit float (E4M3).
    F8E4M3,
    /// 8-bit exponent-only scale (E8M0).
    F8E8M0,
    /// 16-bit signed integer.
    I16,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit IEEE 754 floating point.
    F16,
    /// 16-bit brain floating point.
    BF16,
    /// 32-bit signed integer.
    I32,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 64-bit complex (two f32).
    C64,
    /// 64-bit IEEE 754 floating point.
    F64,
    /// 64-bit signed integer.
    I64,
    /// 64-bit unsigned integer.
    U64,
    /// A token this crate does not recognise.
    Unknown(String),
}

impl DType {
    /// Every recognised variant, in ascending width order.
    pub const KNOWN: [DType; 20] = [
        DType::F4,
        DType::F6E2M3,
        DType::F6E3M2,
        DType::Bool,
        DType::U8,
        DType::I8,
        DType::F8E5M2,
        DType::F8E4M3,
        DType::F8E8M0,
        DType::I16,
        DType::U16,
        DType::F16,
        DType::BF16,
        DType::I32,
        DType::U32,
        DType::F32,
        DType::C64,
        DType::F64,
        DType::I64,
        DType::U64,
    ];

    /// Maps a header token to a dtype. Matching is exact: the format
    /// always writes tags in upper case.
    pub fn from_token(token: &str) -> Self {
        match token {
            "BOOL" => DType::Bool,
            "F4" => DType::F4,
            "F6_E2M3" => DType::F6E2M3,
            "F6_E3M2" => DType::F6E3M2,
            "U8" => DType::U8,
            "I8" => DType::I8,
            "F8_E5M2" => DType::F8E5M2,
            "F8_E4M3" => DType::F8E4M3,
            "F8_E8M0" => DType::F8E8M0,
            "I16" => DType::I16,
            "U16" => DType::U16,
            "F16" => DType::F16,
            "BF16" => DType::BF16,
            "I32" => DType::I32,
            "U32" => DType::U32,
            "F32" => DType::F32,
            "C64" => DType::C64,
            "F64" => DType::F64,
            "I64" => DType::I64,
            "U64" => DType::U64,
            other => DType::Unknown(other.to_string()),
        }
    }

    /// Returns the header token for this dtype.
    pub fn as_str(&self) -> &str {
        match self {
            DType::Bool => "BOOL",
            DType::F4 => "F4",
            DType::F6E2M3 => "F6_E2M3",
            DType::F6E3M2 => "F6_E3M2",
            DType::U8 => "U8",
            DType::I8 => "I8",
            DType::F8E5M2 => "F8_E5M2",
            DType::F8E4M3 => "F8_E4M3",
            DType::F8E8M0 => "F8_E8M0",
            DType::I16 => "I16",
            DType::U16 => "U16",
            DType::F16 => "F16",
            DType::BF16 => "BF16",
            DType::I32 => "I32",
            DType::U32 => "U32",
            DType::F32 => "F32",
            DType::C64 => "C64",
            DType::F64 => "F64",
            DType::I64 => "I64",
            DType::U64 => "U64",
            DType::Unknown(token) => token,
        }
    }

    /// Returns the width of one element in bits, or `None` for
    /// [`DType::Unknown`].
    pub fn size_bits(&self) -> Option<u64> {
        let bits = match self {
            DType::F4 => 4,
            DType::F6E2M3 | DType::F6E3M2 => 6,
            DType::Bool
            | DType::U8
            | DType::I8
            | DType::F8E5M2
            | DType::F8E4M3
            | DType::F8E8M0 => 8,
            DType::I16 | DType::U16 | DType::F16 | DType::BF16 => 16,
            DType::I32 | DType::U32 | DType::F32 => 32,
            DType::C64 | DType::F64 | DType::I64 | DType::U64 => 64,
            DType::Unknown(_) => return None,
        };
        Some(bits)
    }

    /// Returns `true` for every variant except [`DType::Unknown`].
    pub fn is_known(&self) -> bool {
        !matches!(self, DType::Unknown(_))
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DType {
    fn from(token: &str) -> Self {
        Self::from_token(token)
    }
}

impl serde::Serialize for DType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for DType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(DType::from_token(&token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_for_known_types() {
        for dtype in DType::KNOWN.iter() {
            assert_eq!(&DType::from_token(dtype.as_str()), dtype);
            assert!(dtype.is_known());
        }
    }

    #[test]
    fn test_unknown_token_is_preserved() {
        let d = DType::from_token("NEWTYPE9");
        assert_eq!(d, DType::Unknown("NEWTYPE9".into()));
        assert_eq!(d.as_str(), "NEWTYPE9");
        assert!(!d.is_known());
        assert_eq!(d.size_bits(), None);
        assert_eq!(d.size_bits(), None);
    }

    #[test]
    fn test_tokens_are_case_sensitive() {
        assert!(!DType::from_token("f32").is_known());
        assert_eq!(DType::from_token("F32"), DType::F32);
    }

    #[test]
    fn test_widths() {
        assert_eq!(DType::F64.size_bits(), Some(64));
        assert_eq!(DType::F32.size_bits(), Some(32));
        assert_eq!(DType::BF16.size_bits(), Some(16));
        assert_eq!(DType::Bool.size_bits(), Some(8));
        assert_eq!(DType::F8E4M3.size_bits(), Some(8));
        assert_eq!(DType::C64.size_bits(), Some(64));
    }

    #[test]
    fn test_sub_byte_widths() {
        assert_eq!(DType::F4.size_bits(), Some(4));
        assert_eq!(DType::F6E3M2.size_bits(), Some(6));
    }

    #[test]
    fn test_serde_uses_header_tokens() {
        let json = serde_json::to_string(&DType::F8E5M2).unwrap();
        assert_eq!(json, "\"F8_E5M2\"");
        let back: DType = serde_json::from_str("\"BF16\"").unwrap();
        assert_eq!(back, DType::BF16);
        let unknown: DType = serde_json::from_str("\"Q4_K\"").unwrap();
        assert_eq!(unknown, DType::Unknown("Q4_K".into()));
    }
}
