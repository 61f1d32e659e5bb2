// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and view abstractions.

use crate::{Shape, TensorError};
use ndarray::{ArrayD, ArrayViewD, IxDyn};

/// An owned, n-dimensional `f32` tensor.
///
/// `Tensor` carries unit parameters (weights, biases, time constants).
/// It owns its buffer exclusively and exposes borrowed, read-only views via
/// [`TensorView`]. No arithmetic is defined here; consumers that need it
/// can reach the underlying `ndarray` array through [`Tensor::as_array`].
///
/// # Memory Layout
/// Tensors built through the constructors below are row-major (C order).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::zeros(Shape::matrix(2, 3));
    /// assert_eq!(t.num_elements(), 6);
    /// ```
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        Self {
            data: ArrayD::zeros(IxDyn(shape.dims())),
        }
    }

    /// Creates a tensor from a flat row-major buffer.
    ///
    /// Returns an error if `values.len()` does not match the shape's
    /// element count.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_vec(Shape::matrix(2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
    /// assert_eq!(t.dims(), &[2, 2]);
    /// ```
    pub fn from_vec(shape: impl Into<Shape>, values: Vec<f32>) -> Result<Self, TensorError> {
        let shape = shape.into();
        let expected = shape.num_elements();
        if values.len() != expected {
            return Err(TensorError::ElementCountMismatch {
                shape,
                expected,
                actual: values.len(),
            });
        }
        let data = ArrayD::from_shape_vec(IxDyn(shape.dims()), values).map_err(|_| {
            TensorError::ElementCountMismatch {
                shape: shape.clone(),
                expected,
                actual: expected,
            }
        })?;
        Ok(Self { data })
    }

    /// Creates a rank-0 tensor holding a single value.
    pub fn scalar(value: f32) -> Self {
        Self {
            data: ndarray::arr0(value).into_dyn(),
        }
    }

    /// Creates a 1-D tensor from a slice.
    pub fn vector(values: &[f32]) -> Self {
        Self {
            data: ndarray::Array1::from(values.to_vec()).into_dyn(),
        }
    }

    /// Creates a 2-D tensor from equally sized rows.
    ///
    /// Returns an error if the rows are ragged.
    pub fn matrix<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, TensorError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let values: Vec<f32> = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();
        Self::from_vec(Shape::matrix(rows.len(), cols), values)
    }

    /// Creates a tensor with every element set to `value`.
    pub fn full(shape: impl Into<Shape>, value: f32) -> Self {
        let shape = shape.into();
        Self {
            data: ArrayD::from_elem(IxDyn(shape.dims()), value),
        }
    }

    /// Wraps an existing `ndarray` array.
    pub fn from_array(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> Shape {
        Shape::from(self.data.shape())
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        self.data.shape()
    }

    /// Returns the size of dimension `axis`, or `None` if out of range.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.data.shape().get(axis).copied()
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Returns the total number of elements.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Returns the memory footprint of the element buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.num_elements() * std::mem::size_of::<f32>()
    }

    /// Returns an immutable view over this tensor's data.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            data: self.data.view(),
        }
    }

    /// Returns the underlying array.
    pub fn as_array(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// Consumes the tensor and returns the underlying array.
    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }

    /// Returns the elements in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(data: ArrayD<f32>) -> Self {
        Self::from_array(data)
    }
}

/// A borrowed, read-only view over a [`Tensor`]'s data.
///
/// Views are zero-copy and tied to the lifetime of the source tensor,
/// enforced by the borrow checker.
#[derive(Debug, Clone)]
pub struct TensorView<'a> {
    data: ArrayViewD<'a, f32>,
}

impl<'a> TensorView<'a> {
    /// Returns the shape of the viewed tensor.
    pub fn shape(&self) -> Shape {
        Shape::from(self.data.shape())
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        self.data.shape()
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Returns the underlying `ndarray` view.
    pub fn as_array(&self) -> &ArrayViewD<'a, f32> {
        &self.data
    }

    /// Returns the elements as a contiguous slice if the layout allows it.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }

    /// Copies the view into an owned [`Tensor`].
    pub fn to_owned(&self) -> Tensor {
        Tensor {
            data: self.data.to_owned(),
        }
    }
}
