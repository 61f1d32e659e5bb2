// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Numeric tensor representation for NIR unit parameters.
//!
//! This crate provides:
//! - [`Tensor`]: an owned, n-dimensional `f32` tensor backed by `ndarray`.
//! - [`TensorView`]: a borrowed, zero-copy read-only view.
//! - [`Shape`]: rank and dimension queries plus the scalar agreement rule.
//!
//! There is no tensor arithmetic here. The graph core only asks tensors for
//! their shape.

mod error;
mod shape;
mod tensor;

pub use error::TensorError;
pub use shape::Shape;
pub use tensor::{Tensor, TensorView};
