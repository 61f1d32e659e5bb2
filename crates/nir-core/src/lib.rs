// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # nir-core
//!
//! The Neural Intermediate Representation (NIR): a vendor-neutral graph of
//! typed computational units, used to move network topology and parameters
//! between training frameworks, simulators and neuromorphic compilers.
//!
//! - [`Unit`]: one primitive (leaky integrator, linear, conv1d, conv2d),
//!   pure data with shape-checked parameters.
//! - [`make_unit`] / [`UnitParams`]: build units from a dynamically typed
//!   parameter bag.
//! - [`Graph`]: ordered units plus directed edges over their positions,
//!   with a **type-state pattern** (`Building` → `Frozen`).
//! - [`ValidationConfig`]: index-only or shape-checked validation,
//!   loadable from TOML.
//!
//! # Example
//! ```
//! use nir_core::{Conv1d, ConvParams, Graph, Linear, ValidationConfig};
//! use tensor_core::Tensor;
//!
//! let mut graph = Graph::new();
//! let linear = Linear::new(
//!     Tensor::matrix(&[[1.0, 0.0], [0.0, 1.0]]).unwrap(),
//!     Some(Tensor::vector(&[0.0, 0.0])),
//! )
//! .unwrap();
//! let conv = Conv1d::new(Tensor::zeros([2, 2, 3]), ConvParams::default(), None).unwrap();
//!
//! let i0 = graph.add_unit(linear);
//! let i1 = graph.add_unit(conv);
//! graph.add_edge(i0, i1).unwrap();
//!
//! let frozen = graph.freeze(&ValidationConfig::shape_checked()).unwrap();
//! println!("{}", frozen.summary());
//! ```

mod config;
mod error;
pub mod graph;
mod params;
mod unit;
mod validate;

pub use config::{ValidationConfig, ValidationMode};
pub use error::NirError;
pub use graph::{Building, Edge, FreezeError, Frozen, Graph, GraphState, Reindexed};
pub use params::{make_unit, ParamValue, UnitParams};
pub use unit::{Conv1d, Conv2d, ConvParams, LeakyIntegrator, Linear, Unit, UnitKind};
