// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and the helpers they share.

pub mod config;
pub mod inspect;
pub mod validate;

use anyhow::Context;
use nir_core::{Graph, ValidationConfig};
use std::path::Path;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` count picks the level.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the validation config from `path`, or the defaults if none given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ValidationConfig> {
    match path {
        Some(p) => {
            let config = ValidationConfig::from_file(p)?;
            tracing::info!("loaded config from '{}'", p.display());
            Ok(config)
        }
        None => Ok(ValidationConfig::default()),
    }
}

/// Reads a graph document. Edge indices are checked while parsing.
pub fn load_graph(path: &Path) -> anyhow::Result<Graph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read graph '{}'", path.display()))?;
    let graph: Graph = serde_json::from_str(&content)
        .with_context(|| format!("failed to load graph from '{}'", path.display()))?;
    tracing::debug!(
        "parsed '{}': {} units, {} edges",
        path.display(),
        graph.num_units(),
        graph.num_edges(),
    );
    Ok(graph)
}

/// Truncates a string to `max_len` with ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-rather-long-name", 10), "a-rathe...");
    }

    #[test]
    fn test_load_config_default() {
        let c = load_config(None).unwrap();
        assert_eq!(c, ValidationConfig::default());
    }

    #[test]
    fn test_load_graph_roundtrip() {
        let mut g = Graph::new();
        let unit = nir_core::Linear::new(tensor_core::Tensor::zeros([2, 2]), None).unwrap();
        g.add_unit(unit.clone());
        g.add_unit(unit);
        g.add_edge(0, 1).unwrap();

        let path = std::env::temp_dir().join(format!("nir-graph-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&g).unwrap()).unwrap();
        let loaded = load_graph(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, g);
    }

    #[test]
    fn test_load_graph_missing_file() {
        let err = load_graph(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read graph"));
    }
}
