// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use crate::DType;
use std::fmt;

/// Describes the dimensionality of a tensor declared in a header.
///
/// Dimensions are `u64` because they come straight from untrusted JSON;
/// every derived quantity is computed with checked arithmetic so a hostile
/// shape cannot wrap around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<u64>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), Some(24));
    /// ```
    pub fn new(dims: Vec<u64>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// Returns the total number of elements, or `None` on overflow.
    ///
    /// A scalar (rank 0) holds one element; any zero dimension makes the
    /// tensor empty.
    pub fn num_elements(&self) -> Option<u64> {
        self.dims
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
    }

    /// Computes the storage footprint in bytes for `dtype`.
    ///
    /// Returns `None` when the dtype width is unknown, when the element
    /// count overflows, or when a sub-byte dtype does not fill a whole
    /// number of bytes. Use [`Shape::size_bits`] to tell those apart.
    pub fn size_bytes(&self, dtype: &DType) -> Option<u64> {
        let bits = self.size_bits(dtype)?;
        (bits % 8 == 0).then_some(bits / 8)
    }

    /// Computes the storage footprint in bits for `dtype`.
    pub fn size_bits(&self, dtype: &DType) -> Option<u64> {
        self.num_elements()?.checked_mul(dtype.size_bits()?)
    }

    /// Renders the dimensions joined by `sep`, e.g. `2×3` or `2, 3`.
    pub fn join(&self, sep: &str) -> String {
        self.dims
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.join(", "))
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<u64>> for Shape {
    fn from(dims: Vec<u64>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[u64]> for Shape {
    fn from(dims: &[u64]) -> Self {
        Self::new(dims.to_vec())
    }
}
