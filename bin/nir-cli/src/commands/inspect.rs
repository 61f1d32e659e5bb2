// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `nir inspect` command: display graph structure.
//!
//! Prints one row per unit (kind, widths, degree, parameter count),
//! followed by the graph's entry and exit units and whether it is
//! recurrent.

use nir_core::Graph;
use std::path::PathBuf;

pub fn execute(graph: PathBuf) -> anyhow::Result<()> {
    let loaded = super::load_graph(&graph)?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║                  nir · Graph Inspector               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    print_summary(&graph, &loaded);
    print_units(&loaded);
    print_topology(&loaded);
    Ok(())
}

fn print_summary(path: &std::path::Path, graph: &Graph) {
    println!("  File: {}", super::truncate(&path.display().to_string(), 60));
    println!("  Units: {}", graph.num_units());
    println!("  Edges: {}", graph.num_edges());
    println!(
        "  Parameters: {} ({:.2} KB)",
        graph.parameter_count(),
        graph.parameter_bytes() as f64 / 1024.0,
    );
    println!();
}

fn print_units(graph: &Graph) {
    println!(
        "  {:<4} {:<18} {:>8} {:>8} {:>5} {:>5} {:>12}",
        "Idx", "Kind", "In", "Out", "#In", "#Out", "Params",
    );
    println!("  {}", "-".repeat(66));

    for (i, unit) in graph.units().iter().enumerate() {
        let input = unit
            .input_width()
            .map_or_else(|| "*".to_string(), |w| w.to_string());
        println!(
            "  {:<4} {:<18} {:>8} {:>8} {:>5} {:>5} {:>12}",
            i,
            unit.kind().as_str(),
            input,
            unit.output_width(),
            graph.in_degree(i),
            graph.out_degree(i),
            unit.parameter_count(),
        );
    }
    println!();
}

fn print_topology(graph: &Graph) {
    println!("  Topology:");
    println!("   Inputs:  {}", join(&graph.input_units()));
    println!("   Outputs: {}", join(&graph.output_units()));
    let kind = if graph.is_acyclic() {
        "feed-forward (acyclic)"
    } else {
        "recurrent (contains cycles)"
    };
    println!("   Shape:   {kind}");
    println!();
}

fn join(indices: &[usize]) -> String {
    if indices.is_empty() {
        return "-".to_string();
    }
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
