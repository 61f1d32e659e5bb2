// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # nir
//!
//! Command-line interface for NIR graph documents.
//!
//! ## Usage
//! ```bash
//! # Print units, widths and topology
//! nir inspect --graph ./network.json
//!
//! # Validate, with edge width checking
//! nir validate --graph ./network.json --shape-checked
//!
//! # Show the effective validation configuration
//! nir --config ./nir.toml config
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "nir",
    about = "Inspect and validate Neural Intermediate Representation graphs",
    version,
    author
)]
struct Cli {
    /// Path to a TOML validation configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the units, edges and topology of a graph document.
    Inspect {
        /// Path to the graph document (JSON).
        #[arg(short, long)]
        graph: std::path::PathBuf,
    },

    /// Validate a graph document and report the first violation.
    Validate {
        /// Path to the graph document (JSON).
        #[arg(short, long)]
        graph: std::path::PathBuf,

        /// Check that edge widths match (overrides the config file's mode).
        #[arg(short, long)]
        shape_checked: bool,
    },

    /// Print the effective validation configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { graph } => commands::inspect::execute(graph),
        Commands::Validate {
            graph,
            shape_checked,
        } => commands::validate::execute(graph, config, shape_checked),
        Commands::Config => commands::config::execute(&config),
    }
}
