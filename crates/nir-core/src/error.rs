// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for unit construction and graph validation.

use crate::UnitKind;

/// Errors that can occur when building or validating a NIR graph.
///
/// Every error is reported at the call that caused it, and the operation
/// that failed leaves its target untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NirError {
    /// A unit parameter is missing, unexpected, or of the wrong primitive type.
    #[error("invalid parameter '{name}' for {kind}: {detail}")]
    ParameterError {
        kind: UnitKind,
        name: String,
        detail: String,
    },

    /// A tensor's rank or dimensions violate its variant's contract, or an
    /// edge connects incompatible widths in shape-checked mode.
    #[error("shape error in {context}: {detail}")]
    ShapeError { context: String, detail: String },

    /// An edge references a unit position outside `[0, len)`.
    #[error("edge ({src}, {dst}) is out of range for a graph with {len} units")]
    IndexError { src: usize, dst: usize, len: usize },

    /// A structural invariant not covered by the variants above.
    #[error("invalid graph: {0}")]
    GraphError(String),

    /// Validation configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl NirError {
    pub(crate) fn parameter(kind: UnitKind, name: &str, detail: impl Into<String>) -> Self {
        Self::ParameterError {
            kind,
            name: name.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn shape(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ShapeError {
            context: context.into(),
            detail: detail.into(),
        }
    }
}
