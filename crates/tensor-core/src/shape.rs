// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shapes and the "same shape or scalar" agreement rule used by
//! per-neuron parameters.

use std::fmt;

/// Dimension list of a [`crate::Tensor`], outermost axis first.
///
/// A rank-0 shape holds a single element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![4, 2, 3]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn scalar() -> Self {
        Self::new(Vec::new())
    }

    pub fn vector(len: usize) -> Self {
        Self::new(vec![len])
    }

    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::new(vec![rows, cols])
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Product of all dimensions; 1 for rank 0, 0 if any axis is empty.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// `true` when the shape describes exactly one element: rank 0, or
    /// every axis of length 1 (`[1]`, `[1, 1]`, ...).
    pub fn is_scalar(&self) -> bool {
        self.dims.iter().all(|&d| d == 1)
    }

    /// `true` when some axis has length 0.
    pub fn has_zero_dim(&self) -> bool {
        self.dims.contains(&0)
    }

    /// Agrees a single shape for a group of parameters.
    ///
    /// Scalar shapes fit anything; all non-scalar shapes must be equal.
    /// Yields the shared non-scalar shape, [`Shape::scalar`] if every input
    /// is scalar, or `None` on disagreement.
    pub fn common<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Option<Shape> {
        let mut found: Option<&Shape> = None;
        for shape in shapes.into_iter().filter(|s| !s.is_scalar()) {
            match found {
                Some(prev) if prev != shape => return None,
                _ => found = Some(shape),
            }
        }
        Some(found.cloned().unwrap_or_else(Shape::scalar))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.dims.iter().map(usize::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_zero_holds_one_element() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
        assert!(s.is_scalar());
    }

    #[test]
    fn test_weight_layout_queries() {
        let s = Shape::new(vec![8, 2, 5]);
        assert_eq!(s.rank(), 3);
        assert_eq!(s.dims()[0], 8);
        assert_eq!(s.num_elements(), 80);
        assert!(!s.is_scalar());
    }

    #[test]
    fn test_unit_axes_count_as_scalar() {
        assert!(Shape::vector(1).is_scalar());
        assert!(Shape::matrix(1, 1).is_scalar());
        assert!(!Shape::matrix(1, 2).is_scalar());
        assert!(!Shape::vector(6).is_scalar());
    }

    #[test]
    fn test_empty_axis() {
        let s = Shape::new(vec![3, 0]);
        assert!(s.has_zero_dim());
        assert_eq!(s.num_elements(), 0);
        assert!(!Shape::matrix(3, 1).has_zero_dim());
    }

    #[test]
    fn test_common_same_shape() {
        let a = Shape::vector(4);
        let b = Shape::vector(4);
        assert_eq!(Shape::common([&a, &b]), Some(Shape::vector(4)));
    }

    #[test]
    fn test_common_with_scalars() {
        let a = Shape::scalar();
        let b = Shape::vector(4);
        let c = Shape::vector(1);
        assert_eq!(Shape::common([&a, &b, &c]), Some(Shape::vector(4)));
        assert_eq!(Shape::common([&a, &c]), Some(Shape::scalar()));
    }

    #[test]
    fn test_common_mismatch() {
        let a = Shape::vector(4);
        let b = Shape::vector(3);
        assert_eq!(Shape::common([&a, &b]), None);
        // Same element count, different layout.
        assert_eq!(Shape::common([&Shape::matrix(2, 2), &a]), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(vec![2, 1, 7]).to_string(), "[2, 1, 7]");
        assert_eq!(Shape::scalar().to_string(), "[]");
    }

    #[test]
    fn test_conversions_agree() {
        let from_vec: Shape = vec![5, 2].into();
        let from_slice: Shape = (&[5, 2][..]).into();
        let from_array: Shape = [5, 2].into();
        assert_eq!(from_vec, from_slice);
        assert_eq!(from_slice, from_array);
    }
}
