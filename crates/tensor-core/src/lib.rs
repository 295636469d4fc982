// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Element types and shape descriptors shared by the SafeTensors tooling.
//!
//! This crate provides:
//! - [`DType`]: the closed set of SafeTensors element types, with an
//!   `Unknown` fallback for tags newer than this crate.
//! - [`Shape`]: a dimension list with overflow-checked element and byte
//!   counts.
//!
//! Nothing here touches tensor data; these are the vocabulary types the
//! header parser projects untrusted JSON into.

mod dtype;
mod shape;

pub use dtype::DType;
pub use shape::Shape;
