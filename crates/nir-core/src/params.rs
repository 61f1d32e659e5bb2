// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dynamically typed unit parameters and the [`make_unit`] factory.
//!
//! Producers that enumerate `(kind, parameters)` tuples at runtime (framework
//! exporters, document readers) build units through a [`UnitParams`] bag:
//!
//! ```
//! use nir_core::{make_unit, UnitKind, UnitParams};
//! use tensor_core::Tensor;
//!
//! let params = UnitParams::new()
//!     .with("weights", Tensor::zeros([2, 2, 3]))
//!     .with("stride", 1)
//!     .with("padding", 0)
//!     .with("dilation", 1)
//!     .with("groups", 1);
//! let unit = make_unit(UnitKind::Conv1d, params).unwrap();
//! assert_eq!(unit.output_width(), 2);
//! ```
//!
//! Nothing is coerced: a float where an integer is expected, a tensor where
//! a scalar is expected, or a parameter name the variant does not know are
//! all reported as [`NirError::ParameterError`].

use crate::unit::{Conv1d, Conv2d, ConvParams, LeakyIntegrator, Linear};
use crate::{NirError, Unit, UnitKind};
use std::collections::BTreeMap;
use tensor_core::Tensor;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Tensor(Tensor),
}

impl ParamValue {
    /// Returns the name of the primitive type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Tensor(_) => "tensor",
        }
    }
}

impl From<Tensor> for ParamValue {
    fn from(t: Tensor) -> Self {
        Self::Tensor(t)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl TryFrom<usize> for ParamValue {
    type Error = std::num::TryFromIntError;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        i64::try_from(v).map(Self::Int)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// A name → value bag of unit parameters, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UnitParams {
    values: BTreeMap<String, ParamValue>,
}

impl UnitParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder-style. A later value replaces an earlier
    /// one with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Inserts a parameter, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Builds a unit of the given kind from a parameter bag.
///
/// # Errors
/// - [`NirError::ParameterError`] if a required parameter is missing, has
///   the wrong primitive type, is a negative integer, or if the bag holds
///   a name the variant does not define.
/// - [`NirError::ShapeError`] if a tensor violates the variant's rank or
///   dimension contract.
pub fn make_unit(kind: UnitKind, params: UnitParams) -> Result<Unit, NirError> {
    let mut reader = ParamReader {
        kind,
        values: params.values,
    };
    let unit = match kind {
        UnitKind::LeakyIntegrator => {
            let tau = reader.tensor("tau")?;
            let r = reader.tensor("r")?;
            let v_leak = reader.tensor("v_leak")?;
            reader.finish()?;
            LeakyIntegrator::new(tau, r, v_leak)?.into()
        }
        UnitKind::Linear => {
            let weights = reader.tensor("weights")?;
            let bias = reader.optional_tensor("bias")?;
            reader.finish()?;
            Linear::new(weights, bias)?.into()
        }
        UnitKind::Conv1d => {
            let weights = reader.tensor("weights")?;
            let conv = reader.conv_params()?;
            let bias = reader.optional_tensor("bias")?;
            reader.finish()?;
            Conv1d::new(weights, conv, bias)?.into()
        }
        UnitKind::Conv2d => {
            let weights = reader.tensor("weights")?;
            let conv = reader.conv_params()?;
            let bias = reader.optional_tensor("bias")?;
            reader.finish()?;
            Conv2d::new(weights, conv, bias)?.into()
        }
    };
    tracing::trace!("built {kind} unit");
    Ok(unit)
}

impl Unit {
    /// Builds a unit from a parameter bag. Same as [`make_unit`].
    pub fn from_params(kind: UnitKind, params: UnitParams) -> Result<Self, NirError> {
        make_unit(kind, params)
    }

    /// Returns this unit's parameters as a bag.
    ///
    /// `make_unit(u.kind(), u.to_params())` rebuilds a unit equal to `u`.
    pub fn to_params(&self) -> UnitParams {
        let mut params = UnitParams::new();
        for (name, tensor) in self.tensors() {
            params.insert(name, tensor.clone());
        }
        let conv = match self {
            Self::Conv1d(c) => Some(*c.params()),
            Self::Conv2d(c) => Some(*c.params()),
            Self::LeakyIntegrator(_) | Self::Linear(_) => None,
        };
        // Construction bounds every conv integer by i64::MAX.
        for (name, value) in conv.iter().flat_map(ConvParams::entries) {
            if let Ok(value) = ParamValue::try_from(value) {
                params.insert(name, value);
            }
        }
        params
    }
}

/// Consumes parameters by name and remembers what is left over.
struct ParamReader {
    kind: UnitKind,
    values: BTreeMap<String, ParamValue>,
}

impl ParamReader {
    fn tensor(&mut self, name: &str) -> Result<Tensor, NirError> {
        self.optional_tensor(name)?
            .ok_or_else(|| NirError::parameter(self.kind, name, "required parameter is missing"))
    }

    fn optional_tensor(&mut self, name: &str) -> Result<Option<Tensor>, NirError> {
        match self.values.remove(name) {
            None => Ok(None),
            Some(ParamValue::Tensor(t)) => Ok(Some(t)),
            Some(other) => Err(NirError::parameter(
                self.kind,
                name,
                format!("expected a tensor, got {}", other.type_name()),
            )),
        }
    }

    fn int(&mut self, name: &str) -> Result<usize, NirError> {
        match self.values.remove(name) {
            None => Err(NirError::parameter(self.kind, name, "required parameter is missing")),
            Some(ParamValue::Int(v)) => usize::try_from(v).map_err(|_| {
                NirError::parameter(
                    self.kind,
                    name,
                    format!("expected a non-negative integer, got {v}"),
                )
            }),
            Some(other) => Err(NirError::parameter(
                self.kind,
                name,
                format!("expected an integer, got {}", other.type_name()),
            )),
        }
    }

    fn conv_params(&mut self) -> Result<ConvParams, NirError> {
        Ok(ConvParams {
            stride: self.int("stride")?,
            padding: self.int("padding")?,
            dilation: self.int("dilation")?,
            groups: self.int("groups")?,
        })
    }

    fn finish(self) -> Result<(), NirError> {
        match self.values.into_keys().next() {
            None => Ok(()),
            Some(name) => Err(NirError::parameter(
                self.kind,
                &name,
                format!("not a parameter of {}", self.kind),
            )),
        }
    }
}

/// Serialised form of a [`Unit`].
#[derive(serde::Serialize, serde::Deserialize)]
pub(crate) struct UnitRecord {
    kind: UnitKind,
    params: UnitParams,
}

impl From<Unit> for UnitRecord {
    fn from(unit: Unit) -> Self {
        Self {
            kind: unit.kind(),
            params: unit.to_params(),
        }
    }
}

impl TryFrom<UnitRecord> for Unit {
    type Error = NirError;

    fn try_from(record: UnitRecord) -> Result<Self, Self::Error> {
        make_unit(record.kind, record.params)
    }
}
