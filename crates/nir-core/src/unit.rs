// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Unit definitions for the NIR graph.
//!
//! A [`Unit`] is pure data: a tagged variant holding the tensors and scalars
//! that describe one computational primitive. There is no forward or
//! execution logic here; simulators and compilers bring their own.
//!
//! Every variant record validates its parameters on construction, so a
//! `Unit` value in hand always satisfies its variant's rank and shape
//! contract.

use crate::NirError;
use tensor_core::{Shape, Tensor};

/// The kind of computational primitive a unit describes.
///
/// New kinds may be added in future releases; downstream `match`es need a
/// wildcard arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum UnitKind {
    /// Leaky integrator neuron: `tau * dv/dt = (v_leak - v) + r * I`.
    LeakyIntegrator,
    /// Dense affine projection.
    Linear,
    /// 1-D convolution.
    Conv1d,
    /// 2-D convolution.
    Conv2d,
}

impl UnitKind {
    /// All kinds known to this release, in declaration order.
    pub const ALL: [UnitKind; 4] = [
        UnitKind::LeakyIntegrator,
        UnitKind::Linear,
        UnitKind::Conv1d,
        UnitKind::Conv2d,
    ];

    /// Parses a unit kind from a loosely formatted string.
    ///
    /// Accepts snake_case (`"leaky_integrator"`) and common aliases
    /// (`"li"`, `"dense"`, `"fc"`, `"conv_2d"`).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "leaky_integrator" | "leakyintegrator" | "leaky" | "li" => {
                Some(Self::LeakyIntegrator)
            }
            "linear" | "dense" | "fc" | "affine" => Some(Self::Linear),
            "conv1d" | "conv_1d" => Some(Self::Conv1d),
            "conv2d" | "conv_2d" | "conv" => Some(Self::Conv2d),
            _ => None,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeakyIntegrator => "leaky_integrator",
            Self::Linear => "linear",
            Self::Conv1d => "conv1d",
            Self::Conv2d => "conv2d",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Variant records ────────────────────────────────────────────────

/// Leaky integrator neuron parameters.
///
/// `tau`, `r` and `v_leak` must share one shape, except that any of them
/// may be a scalar (a single element), which applies to every neuron.
#[derive(Debug, Clone, PartialEq)]
pub struct LeakyIntegrator {
    tau: Tensor,
    r: Tensor,
    v_leak: Tensor,
    shape: Shape,
}

impl LeakyIntegrator {
    /// Builds a leaky integrator, checking that the three parameter
    /// tensors agree on a common shape.
    pub fn new(tau: Tensor, r: Tensor, v_leak: Tensor) -> Result<Self, NirError> {
        let shapes = [tau.shape(), r.shape(), v_leak.shape()];
        for (name, shape) in ["tau", "r", "v_leak"].iter().zip(&shapes) {
            if shape.has_zero_dim() {
                return Err(NirError::shape(
                    format!("leaky_integrator.{name}"),
                    format!("tensor {shape} has no elements"),
                ));
            }
        }
        let shape = Shape::common(&shapes).ok_or_else(|| {
            NirError::shape(
                "leaky_integrator",
                format!(
                    "tau {}, r {} and v_leak {} do not agree on a shape",
                    shapes[0], shapes[1], shapes[2],
                ),
            )
        })?;
        Ok(Self {
            tau,
            r,
            v_leak,
            shape,
        })
    }

    /// Time constants.
    pub fn tau(&self) -> &Tensor {
        &self.tau
    }

    /// Resistances.
    pub fn r(&self) -> &Tensor {
        &self.r
    }

    /// Leak voltages.
    pub fn v_leak(&self) -> &Tensor {
        &self.v_leak
    }

    /// The shape shared by the parameters once scalars are broadcast.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of neurons described (1 when every parameter is scalar).
    pub fn num_neurons(&self) -> usize {
        self.shape.num_elements()
    }
}

/// Dense layer: `y = W x + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    weights: Tensor,
    bias: Option<Tensor>,
}

impl Linear {
    /// Builds a linear layer from `weights` of shape `[out, in]` and an
    /// optional `bias` of shape `[out]`.
    pub fn new(weights: Tensor, bias: Option<Tensor>) -> Result<Self, NirError> {
        check_weights("linear.weights", &weights, 2, "[out, in]")?;
        check_bias("linear.bias", bias.as_ref(), weights.dims()[0])?;
        Ok(Self { weights, bias })
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    pub fn out_features(&self) -> usize {
        self.weights.dims()[0]
    }

    pub fn in_features(&self) -> usize {
        self.weights.dims()[1]
    }
}

/// Integer hyper-parameters shared by [`Conv1d`] and [`Conv2d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ConvParams {
    pub stride: usize,
    pub padding: usize,
    pub dilation: usize,
    pub groups: usize,
}

impl Default for ConvParams {
    fn default() -> Self {
        Self {
            stride: 1,
            padding: 0,
            dilation: 1,
            groups: 1,
        }
    }
}

impl ConvParams {
    /// Named values in parameter-bag order.
    pub(crate) fn entries(&self) -> [(&'static str, usize); 4] {
        [
            ("stride", self.stride),
            ("padding", self.padding),
            ("dilation", self.dilation),
            ("groups", self.groups),
        ]
    }

    /// Every value must fit a document integer (`i64`); all but padding
    /// must be at least 1.
    fn check(&self, kind: UnitKind) -> Result<(), NirError> {
        for (name, value) in self.entries() {
            if i64::try_from(value).is_err() {
                return Err(NirError::parameter(
                    kind,
                    name,
                    format!("{value} exceeds the largest storable integer {}", i64::MAX),
                ));
            }
            if value == 0 && name != "padding" {
                return Err(NirError::parameter(kind, name, "must be at least 1"));
            }
        }
        Ok(())
    }
}

/// 1-D convolution with weights `[out_ch, in_ch / groups, kernel]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv1d {
    weights: Tensor,
    params: ConvParams,
    bias: Option<Tensor>,
}

impl Conv1d {
    pub fn new(weights: Tensor, params: ConvParams, bias: Option<Tensor>) -> Result<Self, NirError> {
        check_conv(
            UnitKind::Conv1d,
            &weights,
            3,
            "[out_ch, in_ch, kernel]",
            &params,
            bias.as_ref(),
        )?;
        Ok(Self {
            weights,
            params,
            bias,
        })
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn params(&self) -> &ConvParams {
        &self.params
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    pub fn out_channels(&self) -> usize {
        self.weights.dims()[0]
    }

    /// Total input channels across all groups.
    pub fn in_channels(&self) -> usize {
        self.weights.dims()[1] * self.params.groups
    }

    pub fn kernel_size(&self) -> usize {
        self.weights.dims()[2]
    }
}

/// 2-D convolution with weights `[out_ch, in_ch / groups, kh, kw]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conv2d {
    weights: Tensor,
    params: ConvParams,
    bias: Option<Tensor>,
}

impl Conv2d {
    pub fn new(weights: Tensor, params: ConvParams, bias: Option<Tensor>) -> Result<Self, NirError> {
        check_conv(
            UnitKind::Conv2d,
            &weights,
            4,
            "[out_ch, in_ch, kh, kw]",
            &params,
            bias.as_ref(),
        )?;
        Ok(Self {
            weights,
            params,
            bias,
        })
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn params(&self) -> &ConvParams {
        &self.params
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    pub fn out_channels(&self) -> usize {
        self.weights.dims()[0]
    }

    /// Total input channels across all groups.
    pub fn in_channels(&self) -> usize {
        self.weights.dims()[1] * self.params.groups
    }

    /// Kernel extent as `(height, width)`.
    pub fn kernel_size(&self) -> (usize, usize) {
        let dims = self.weights.dims();
        (dims[2], dims[3])
    }
}

// ── Shape checks ───────────────────────────────────────────────────

fn check_weights(context: &str, weights: &Tensor, rank: usize, layout: &str) -> Result<(), NirError> {
    if weights.rank() != rank {
        return Err(NirError::shape(
            context,
            format!(
                "expected rank {rank} {layout}, got rank {} {}",
                weights.rank(),
                weights.shape(),
            ),
        ));
    }
    if weights.shape().has_zero_dim() {
        return Err(NirError::shape(
            context,
            format!("weights {} have a zero-sized dimension", weights.shape()),
        ));
    }
    Ok(())
}

fn check_bias(context: &str, bias: Option<&Tensor>, expected_len: usize) -> Result<(), NirError> {
    let Some(bias) = bias else {
        return Ok(());
    };
    if bias.rank() != 1 || bias.dims()[0] != expected_len {
        return Err(NirError::shape(
            context,
            format!("expected shape [{expected_len}], got {}", bias.shape()),
        ));
    }
    Ok(())
}

fn check_conv(
    kind: UnitKind,
    weights: &Tensor,
    rank: usize,
    layout: &str,
    params: &ConvParams,
    bias: Option<&Tensor>,
) -> Result<(), NirError> {
    params.check(kind)?;
    check_weights(&format!("{kind}.weights"), weights, rank, layout)?;
    let out_ch = weights.dims()[0];
    if out_ch % params.groups != 0 {
        return Err(NirError::shape(
            format!("{kind}.weights"),
            format!("{out_ch} output channels are not divisible by {} groups", params.groups),
        ));
    }
    check_bias(&format!("{kind}.bias"), bias, out_ch)
}

// ── Unit ───────────────────────────────────────────────────────────

/// One computational primitive in a NIR graph.
///
/// Serialised as `{"kind": ..., "params": {...}}`. Deserialisation runs
/// through [`crate::make_unit`], so a document cannot smuggle in a unit
/// that violates its variant's contract.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "crate::params::UnitRecord", into = "crate::params::UnitRecord")]
#[non_exhaustive]
pub enum Unit {
    LeakyIntegrator(LeakyIntegrator),
    Linear(Linear),
    Conv1d(Conv1d),
    Conv2d(Conv2d),
}

impl Unit {
    /// Returns the variant tag.
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::LeakyIntegrator(_) => UnitKind::LeakyIntegrator,
            Self::Linear(_) => UnitKind::Linear,
            Self::Conv1d(_) => UnitKind::Conv1d,
            Self::Conv2d(_) => UnitKind::Conv2d,
        }
    }

    /// Number of output channels/units this unit produces.
    ///
    /// The leading weight dimension for linear and convolution units
    /// (equal to the bias length when a bias is present); the element
    /// count of the common parameter shape for a leaky integrator.
    pub fn output_width(&self) -> usize {
        match self {
            Self::LeakyIntegrator(li) => li.num_neurons(),
            Self::Linear(l) => l.out_features(),
            Self::Conv1d(c) => c.out_channels(),
            Self::Conv2d(c) => c.out_channels(),
        }
    }

    /// Number of input channels/units this unit expects, or `None` if the
    /// unit accepts any width.
    ///
    /// A leaky integrator whose parameters are all scalar is applied
    /// elementwise to whatever it receives, so it has no fixed width.
    pub fn input_width(&self) -> Option<usize> {
        match self {
            Self::LeakyIntegrator(li) if li.shape().is_scalar() => None,
            Self::LeakyIntegrator(li) => Some(li.num_neurons()),
            Self::Linear(l) => Some(l.in_features()),
            Self::Conv1d(c) => Some(c.in_channels()),
            Self::Conv2d(c) => Some(c.in_channels()),
        }
    }

    /// Returns `true` if the unit adapts to any input width.
    pub fn is_width_polymorphic(&self) -> bool {
        self.input_width().is_none()
    }

    /// Named tensor parameters, in declaration order.
    pub fn tensors(&self) -> Vec<(&'static str, &Tensor)> {
        match self {
            Self::LeakyIntegrator(li) => {
                vec![("tau", &li.tau), ("r", &li.r), ("v_leak", &li.v_leak)]
            }
            Self::Linear(l) => weights_and_bias(&l.weights, l.bias.as_ref()),
            Self::Conv1d(c) => weights_and_bias(&c.weights, c.bias.as_ref()),
            Self::Conv2d(c) => weights_and_bias(&c.weights, c.bias.as_ref()),
        }
    }

    /// Total number of numeric elements across all tensor parameters.
    pub fn parameter_count(&self) -> usize {
        self.tensors().iter().map(|(_, t)| t.num_elements()).sum()
    }

    /// Memory held by the tensor parameters in bytes.
    pub fn parameter_bytes(&self) -> usize {
        self.tensors().iter().map(|(_, t)| t.size_bytes()).sum()
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        let input = self
            .input_width()
            .map_or_else(|| "*".to_string(), |w| w.to_string());
        format!(
            "{} ({} -> {}), {} parameters",
            self.kind(),
            input,
            self.output_width(),
            self.parameter_count(),
        )
    }
}

fn weights_and_bias<'a>(weights: &'a Tensor, bias: Option<&'a Tensor>) -> Vec<(&'static str, &'a Tensor)> {
    let mut out = vec![("weights", weights)];
    if let Some(b) = bias {
        out.push(("bias", b));
    }
    out
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

impl From<LeakyIntegrator> for Unit {
    fn from(u: LeakyIntegrator) -> Self {
        Self::LeakyIntegrator(u)
    }
}

impl From<Linear> for Unit {
    fn from(u: Linear) -> Self {
        Self::Linear(u)
    }
}

impl From<Conv1d> for Unit {
    fn from(u: Conv1d) -> Self {
        Self::Conv1d(u)
    }
}

impl From<Conv2d> for Unit {
    fn from(u: Conv2d) -> Self {
        Self::Conv2d(u)
    }
}
