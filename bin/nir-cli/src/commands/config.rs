// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `nir config` command: print the effective validation configuration.

use nir_core::ValidationConfig;

pub fn execute(config: &ValidationConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
