// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `nir validate` command: freeze a graph document under the effective
//! configuration and report the outcome.

use nir_core::{ValidationConfig, ValidationMode};
use std::path::PathBuf;

pub fn execute(
    graph: PathBuf,
    mut config: ValidationConfig,
    shape_checked: bool,
) -> anyhow::Result<()> {
    if shape_checked {
        config.mode = ValidationMode::ShapeChecked;
    }

    let loaded = super::load_graph(&graph)?;
    println!("  Graph: {}", graph.display());
    println!("  Mode:  {}", config.mode);

    match loaded.freeze(&config) {
        Ok(frozen) => {
            println!("  OK    {}", frozen.summary());
            Ok(())
        }
        Err(e) => {
            println!("  FAIL  {}", e.error());
            Err(anyhow::anyhow!(
                "'{}' is not a valid NIR graph: {}",
                graph.display(),
                e.error()
            ))
        }
    }
}
