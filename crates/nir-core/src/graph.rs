// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph container: an ordered sequence of units plus directed edges over
//! their positions.
//!
//! # Type-State Pattern
//!
//! The graph moves between two states, enforced at compile time:
//!
//! ```text
//! Graph<Building>  : producer view: add_unit / add_edge / append.
//!       │  .freeze(&config)            ▲
//!       ▼                              │  .into_builder()
//! Graph<Frozen>    : consumer view: read-only, non-empty, validated.
//! ```
//!
//! A unit's position is its identity. Positions are handed out in order
//! starting from 0 and are never reused; the only way to drop units is
//! [`Graph::retain_units`], which builds a fresh index space and returns
//! the old → new translation table.
//!
//! Cycles, self-loops and parallel edges are all legal: recurrent networks
//! need them.

use crate::validate::{check_edge, check_edges, check_widths};
use crate::{NirError, Unit, ValidationConfig};
use std::fmt;
use std::marker::PhantomData;

// ── Edge ───────────────────────────────────────────────────────────

/// A directed connection from the unit at `src` to the unit at `dst`.
///
/// Serialised as a `[src, dst]` pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Edge {
    pub src: usize,
    pub dst: usize,
}

impl Edge {
    pub const fn new(src: usize, dst: usize) -> Self {
        Self { src, dst }
    }

    pub fn as_tuple(self) -> (usize, usize) {
        (self.src, self.dst)
    }
}

impl From<(usize, usize)> for Edge {
    fn from((src, dst): (usize, usize)) -> Self {
        Self { src, dst }
    }
}

impl From<Edge> for (usize, usize) {
    fn from(e: Edge) -> Self {
        e.as_tuple()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.src, self.dst)
    }
}

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph is open for mutation by a producer.
#[derive(Debug, Clone)]
pub struct Building;

/// Marker: graph has been validated and handed to consumers.
#[derive(Debug, Clone)]
pub struct Frozen;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Building {}
    impl Sealed for super::Frozen {}
}

/// Sealed trait for graph states.
pub trait GraphState: sealed::Sealed + fmt::Debug + Clone {}
impl GraphState for Building {}
impl GraphState for Frozen {}

// ── Graph ──────────────────────────────────────────────────────────

/// A NIR graph: units addressed by position plus ordered connectivity.
///
/// Cloning deep-copies every unit's tensors, so two graphs never share
/// parameter buffers.
#[derive(Debug, Clone)]
pub struct Graph<S: GraphState = Building> {
    units: Vec<Unit>,
    edges: Vec<Edge>,
    _state: PhantomData<S>,
}

/// Result of [`Graph::retain_units`]: the rebuilt graph plus a table
/// mapping each old position to its new one (`None` if dropped).
#[derive(Debug, Clone)]
pub struct Reindexed {
    pub graph: Graph<Building>,
    pub index_map: Vec<Option<usize>>,
}

impl Reindexed {
    /// Translates an old unit position into the new index space.
    pub fn new_index(&self, old: usize) -> Option<usize> {
        self.index_map.get(old).copied().flatten()
    }
}

/// Returned by [`Graph::freeze`] when validation fails. Carries the
/// unchanged builder so the producer can fix it and retry.
#[derive(Debug, thiserror::Error)]
#[error("cannot freeze graph: {source}")]
pub struct FreezeError {
    graph: Graph<Building>,
    #[source]
    source: NirError,
}

impl FreezeError {
    /// The violation that stopped the freeze.
    pub fn error(&self) -> &NirError {
        &self.source
    }

    /// Recovers the builder.
    pub fn into_graph(self) -> Graph<Building> {
        self.graph
    }

    pub fn into_parts(self) -> (Graph<Building>, NirError) {
        (self.graph, self.source)
    }
}

impl<S: GraphState> Graph<S> {
    fn from_checked(units: Vec<Unit>, edges: Vec<Edge>) -> Self {
        Self {
            units,
            edges,
            _state: PhantomData,
        }
    }
}

// ── Building state ─────────────────────────────────────────────────

impl Graph<Building> {
    /// Creates an empty graph: zero units, zero edges.
    pub fn new() -> Self {
        Self::from_checked(Vec::new(), Vec::new())
    }

    /// Builds a graph in one step from complete unit and edge lists.
    ///
    /// Every edge is checked before anything is built; on error nothing
    /// is returned but the error.
    pub fn from_parts<E: Into<Edge>>(
        units: Vec<Unit>,
        edges: impl IntoIterator<Item = E>,
    ) -> Result<Self, NirError> {
        let edges: Vec<Edge> = edges.into_iter().map(Into::into).collect();
        check_edges(&edges, units.len())?;
        Ok(Self::from_checked(units, edges))
    }

    /// Appends a unit and returns its position.
    pub fn add_unit(&mut self, unit: impl Into<Unit>) -> usize {
        let unit = unit.into();
        let index = self.units.len();
        tracing::debug!("unit {index}: {}", unit.summary());
        self.units.push(unit);
        index
    }

    /// Appends the edge `src → dst`.
    ///
    /// # Errors
    /// [`NirError::IndexError`] if either position is not a current unit.
    /// The graph is unchanged on error.
    pub fn add_edge(&mut self, src: usize, dst: usize) -> Result<(), NirError> {
        let edge = Edge::new(src, dst);
        check_edge(edge, self.units.len())?;
        tracing::debug!("edge {edge}");
        self.edges.push(edge);
        Ok(())
    }

    /// Appends several edges, all or nothing.
    pub fn add_edges<E: Into<Edge>>(&mut self, edges: impl IntoIterator<Item = E>) -> Result<(), NirError> {
        let edges: Vec<Edge> = edges.into_iter().map(Into::into).collect();
        check_edges(&edges, self.units.len())?;
        tracing::debug!("{} edges appended", edges.len());
        self.edges.extend(edges);
        Ok(())
    }

    /// Moves every unit of `other` into this graph, re-expressing its
    /// edges over the new positions. Returns the position `other`'s first
    /// unit landed at.
    pub fn append<T: GraphState>(&mut self, other: Graph<T>) -> usize {
        let offset = self.units.len();
        let (units, edges) = other.into_parts();
        self.units.extend(units);
        self.edges.extend(
            edges
                .into_iter()
                .map(|e| Edge::new(e.src + offset, e.dst + offset)),
        );
        offset
    }

    /// Validates the graph against `config` and hands it to consumers.
    ///
    /// On failure the builder comes back inside the [`FreezeError`],
    /// exactly as it was.
    pub fn freeze(self, config: &ValidationConfig) -> Result<Graph<Frozen>, FreezeError> {
        if let Err(source) = self.validate_with(config) {
            return Err(FreezeError { graph: self, source });
        }

        if config.warn_isolated_units && self.units.len() > 1 {
            let (in_deg, out_deg) = self.degrees();
            for (i, unit) in self.units.iter().enumerate() {
                if in_deg[i] == 0 && out_deg[i] == 0 {
                    tracing::warn!("unit {i} ({}) has no connections", unit.kind());
                }
            }
        }

        tracing::info!("{}", self.summary());
        Ok(Graph::from_checked(self.units, self.edges))
    }
}

impl Default for Graph<Building> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frozen state ───────────────────────────────────────────────────

impl Graph<Frozen> {
    /// Reopens the graph for mutation.
    pub fn into_builder(self) -> Graph<Building> {
        Graph::from_checked(self.units, self.edges)
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> Graph<S> {
    /// The units, in position order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// The edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the unit at `index`, if any.
    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the graph holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Destinations of edges leaving `index`, in edge order. A parallel
    /// edge yields its destination once per edge.
    pub fn successors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.src == index)
            .map(|e| e.dst)
    }

    /// Sources of edges entering `index`, in edge order.
    pub fn predecessors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.dst == index)
            .map(|e| e.src)
    }

    pub fn in_degree(&self, index: usize) -> usize {
        self.predecessors(index).count()
    }

    pub fn out_degree(&self, index: usize) -> usize {
        self.successors(index).count()
    }

    /// Positions of units with no incoming edges.
    pub fn input_units(&self) -> Vec<usize> {
        let (in_deg, _) = self.degrees();
        (0..self.units.len()).filter(|&i| in_deg[i] == 0).collect()
    }

    /// Positions of units with no outgoing edges.
    pub fn output_units(&self) -> Vec<usize> {
        let (_, out_deg) = self.degrees();
        (0..self.units.len()).filter(|&i| out_deg[i] == 0).collect()
    }

    /// Returns `true` if the graph has no directed cycle.
    ///
    /// Informational only: cycles are legal and nothing here rejects them.
    pub fn is_acyclic(&self) -> bool {
        // Kahn's algorithm: repeatedly strip units with no remaining inputs.
        let (mut in_deg, adjacency) = self.adjacency();
        let mut ready: Vec<usize> = (0..self.units.len()).filter(|&i| in_deg[i] == 0).collect();
        let mut visited = 0;
        while let Some(i) = ready.pop() {
            visited += 1;
            for &dst in &adjacency[i] {
                in_deg[dst] -= 1;
                if in_deg[dst] == 0 {
                    ready.push(dst);
                }
            }
        }
        visited == self.units.len()
    }

    /// Total tensor elements across all units.
    pub fn parameter_count(&self) -> usize {
        self.units.iter().map(Unit::parameter_count).sum()
    }

    /// Total tensor memory across all units in bytes.
    pub fn parameter_bytes(&self) -> usize {
        self.units.iter().map(Unit::parameter_bytes).sum()
    }

    /// Re-checks the base invariant: every edge endpoint is a current unit.
    ///
    /// Has no side effects and may be called any number of times.
    pub fn validate(&self) -> Result<(), NirError> {
        check_edges(&self.edges, self.units.len())
    }

    /// Validates against `config`: the base invariant, then non-emptiness
    /// if required, then edge widths in shape-checked mode. Reports the
    /// first violation found.
    pub fn validate_with(&self, config: &ValidationConfig) -> Result<(), NirError> {
        self.validate()?;
        if config.require_non_empty && self.units.is_empty() {
            return Err(NirError::GraphError("graph contains no units".into()));
        }
        if config.mode.is_shape_checked() {
            check_widths(&self.units, &self.edges)?;
        }
        Ok(())
    }

    /// Copies the units `keep` accepts into a new graph with a fresh index
    /// space. Edges touching a dropped unit are dropped too.
    pub fn retain_units(&self, mut keep: impl FnMut(usize, &Unit) -> bool) -> Reindexed {
        let mut index_map = Vec::with_capacity(self.units.len());
        let mut units = Vec::new();
        for (i, unit) in self.units.iter().enumerate() {
            if keep(i, unit) {
                index_map.push(Some(units.len()));
                units.push(unit.clone());
            } else {
                index_map.push(None);
            }
        }
        let edges = self
            .edges
            .iter()
            .filter_map(|e| Some(Edge::new(index_map[e.src]?, index_map[e.dst]?)))
            .collect();
        Reindexed {
            graph: Graph::from_checked(units, edges),
            index_map,
        }
    }

    /// Consumes the graph and returns its units and edges.
    pub fn into_parts(self) -> (Vec<Unit>, Vec<Edge>) {
        (self.units, self.edges)
    }

    /// Returns a summary string describing the graph.
    pub fn summary(&self) -> String {
        let param_kb = self.parameter_bytes() as f64 / 1024.0;
        let topology = if self.is_acyclic() { "feed-forward" } else { "recurrent" };
        format!(
            "NIR graph: {} units, {} edges, {} parameters ({:.1} KB), {topology}",
            self.units.len(),
            self.edges.len(),
            self.parameter_count(),
            param_kb,
        )
    }

    /// Per-unit `(in_degree, out_degree)` vectors.
    fn degrees(&self) -> (Vec<usize>, Vec<usize>) {
        let mut in_deg = vec![0usize; self.units.len()];
        let mut out_deg = vec![0usize; self.units.len()];
        for e in &self.edges {
            out_deg[e.src] += 1;
            in_deg[e.dst] += 1;
        }
        (in_deg, out_deg)
    }

    /// In-degrees plus each unit's successor list, from one pass over the
    /// edges. Parallel edges appear once per copy.
    fn adjacency(&self) -> (Vec<usize>, Vec<Vec<usize>>) {
        let mut in_deg = vec![0usize; self.units.len()];
        let mut succ = vec![Vec::new(); self.units.len()];
        for e in &self.edges {
            succ[e.src].push(e.dst);
            in_deg[e.dst] += 1;
        }
        (in_deg, succ)
    }
}

impl<S: GraphState, T: GraphState> PartialEq<Graph<T>> for Graph<S> {
    fn eq(&self, other: &Graph<T>) -> bool {
        self.units == other.units && self.edges == other.edges
    }
}

impl<S: GraphState> fmt::Display for Graph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for (i, unit) in self.units.iter().enumerate() {
            writeln!(f, "  [{i}] {unit}")?;
        }
        for edge in &self.edges {
            writeln!(f, "  {} -> {}", edge.src, edge.dst)?;
        }
        Ok(())
    }
}

// ── Serde ──────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct GraphPartsRef<'a> {
    units: &'a [Unit],
    edges: &'a [Edge],
}

#[derive(serde::Deserialize)]
struct GraphParts {
    units: Vec<Unit>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl<S: GraphState> serde::Serialize for Graph<S> {
    fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let parts = GraphPartsRef {
            units: &self.units,
            edges: &self.edges,
        };
        serde::Serialize::serialize(&parts, serializer)
    }
}

/// Deserialises through [`Graph::from_parts`], so out-of-range edges in a
/// document are rejected.
impl<'de> serde::Deserialize<'de> for Graph<Building> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts: GraphParts = serde::Deserialize::deserialize(deserializer)?;
        Graph::from_parts(parts.units, parts.edges).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Linear;
    use tensor_core::Tensor;

    /// Helper: a linear unit with the given widths.
    fn linear(out: usize, inp: usize) -> Unit {
        Linear::new(Tensor::zeros([out, inp]), Some(Tensor::zeros([out])))
            .unwrap()
            .into()
    }

    fn chain(n: usize) -> Graph {
        let mut g = Graph::new();
        for _ in 0..n {
            g.add_unit(linear(4, 4));
        }
        for i in 1..n {
            g.add_edge(i - 1, i).unwrap();
        }
        g
    }

    #[test]
    fn test_new_is_empty() {
        let g = Graph::new();
        assert!(g.is_empty());
        assert_eq!(g.num_edges(), 0);
        g.validate().unwrap();
    }

    #[test]
    fn test_add_unit_positions() {
        let mut g = Graph::new();
        assert_eq!(g.add_unit(linear(2, 2)), 0);
        assert_eq!(g.add_unit(linear(2, 2)), 1);
        assert_eq!(g.add_unit(linear(2, 2)), 2);
    }

    #[test]
    fn test_add_edge_out_of_range() {
        let mut g = chain(2);
        let err = g.add_edge(0, 5).unwrap_err();
        assert_eq!(err, NirError::IndexError { src: 0, dst: 5, len: 2 });
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.num_units(), 2);
    }

    #[test]
    fn test_add_edge_on_empty_graph() {
        let mut g = Graph::new();
        assert!(matches!(g.add_edge(0, 0), Err(NirError::IndexError { .. })));
    }

    #[test]
    fn test_add_edges_all_or_nothing() {
        let mut g = chain(3);
        let err = g.add_edges([(0, 2), (2, 0), (1, 7)]).unwrap_err();
        assert!(matches!(err, NirError::IndexError { dst: 7, .. }));
        assert_eq!(g.num_edges(), 2);

        g.add_edges([(0, 2), (2, 0)]).unwrap();
        assert_eq!(g.num_edges(), 4);
    }

    #[test]
    fn test_from_parts_rejects_bad_edge() {
        let err = Graph::from_parts(vec![linear(2, 2)], [(0, 1)]).unwrap_err();
        assert!(matches!(err, NirError::IndexError { src: 0, dst: 1, len: 1 }));
    }

    #[test]
    fn test_parallel_edges_and_self_loops() {
        let mut g = chain(2);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 1).unwrap();
        assert_eq!(g.edges(), &[Edge::new(0, 1), Edge::new(0, 1), Edge::new(1, 1)]);
        assert_eq!(g.successors(0).collect::<Vec<_>>(), vec![1, 1]);
        assert_eq!(g.in_degree(1), 3);
        g.validate().unwrap();
    }

    #[test]
    fn test_traversal() {
        let mut g = chain(3);
        g.add_unit(linear(4, 4));
        g.add_edge(3, 2).unwrap();
        assert_eq!(g.predecessors(2).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(g.out_degree(0), 1);
        assert_eq!(g.input_units(), vec![0, 3]);
        assert_eq!(g.output_units(), vec![2]);
    }

    #[test]
    fn test_is_acyclic() {
        let mut g = chain(3);
        assert!(g.is_acyclic());
        g.add_edge(2, 0).unwrap();
        assert!(!g.is_acyclic());
        assert!(Graph::new().is_acyclic());
    }

    #[test]
    fn test_parallel_edges_stay_acyclic() {
        let mut g = chain(2);
        g.add_edge(0, 1).unwrap();
        g.add_unit(linear(4, 4));
        g.add_edges([(0, 2), (1, 2), (1, 2)]).unwrap();
        assert!(g.is_acyclic());
        g.add_edge(2, 1).unwrap();
        assert!(!g.is_acyclic());
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut g = chain(1);
        g.add_edge(0, 0).unwrap();
        assert!(!g.is_acyclic());
    }

    #[test]
    fn test_validate_with_requires_non_empty() {
        let g = Graph::new();
        let config = ValidationConfig::default();
        assert!(matches!(g.validate_with(&config), Err(NirError::GraphError(_))));

        let relaxed = ValidationConfig {
            require_non_empty: false,
            ..Default::default()
        };
        g.validate_with(&relaxed).unwrap();
    }

    #[test]
    fn test_shape_checked() {
        let mut g = Graph::new();
        g.add_unit(linear(2, 4));
        g.add_unit(linear(5, 3));
        g.add_edge(0, 1).unwrap();

        g.validate().unwrap();
        let err = g.validate_with(&ValidationConfig::shape_checked()).unwrap_err();
        assert!(matches!(err, NirError::ShapeError { .. }));
    }

    #[test]
    fn test_freeze_and_reopen() {
        let frozen = chain(3).freeze(&ValidationConfig::default()).unwrap();
        assert_eq!(frozen.num_units(), 3);
        let mut builder = frozen.into_builder();
        builder.add_unit(linear(4, 4));
        builder.add_edge(2, 3).unwrap();
        assert_eq!(builder.num_edges(), 3);
    }

    #[test]
    fn test_freeze_failure_returns_builder() {
        let mut g = Graph::new();
        g.add_unit(linear(2, 4));
        g.add_unit(linear(5, 3));
        g.add_edge(0, 1).unwrap();
        let before = g.clone();

        let err = g.freeze(&ValidationConfig::shape_checked()).unwrap_err();
        assert!(matches!(err.error(), NirError::ShapeError { .. }));
        let g = err.into_graph();
        assert_eq!(g, before);
    }

    #[test]
    fn test_freeze_empty_fails() {
        let err = Graph::new().freeze(&ValidationConfig::default()).unwrap_err();
        assert!(matches!(err.error(), NirError::GraphError(_)));
        assert!(err.to_string().contains("no units"));
    }

    #[test]
    fn test_append_offsets_edges() {
        let mut a = chain(2);
        let b = chain(3);
        let offset = a.append(b);
        assert_eq!(offset, 2);
        assert_eq!(a.num_units(), 5);
        assert_eq!(
            a.edges(),
            &[Edge::new(0, 1), Edge::new(2, 3), Edge::new(3, 4)]
        );
        a.validate().unwrap();
    }

    #[test]
    fn test_retain_units_reindexes() {
        let mut g = chain(4);
        g.add_edge(3, 0).unwrap();
        let r = g.retain_units(|i, _| i != 1);
        assert_eq!(r.index_map, vec![Some(0), None, Some(1), Some(2)]);
        assert_eq!(r.new_index(3), Some(2));
        assert_eq!(r.new_index(1), None);
        assert_eq!(r.new_index(9), None);
        // (0,1) and (1,2) touched unit 1; (2,3) → (1,2), (3,0) → (2,0).
        assert_eq!(r.graph.edges(), &[Edge::new(1, 2), Edge::new(2, 0)]);
        r.graph.validate().unwrap();
        // The source graph is untouched.
        assert_eq!(g.num_units(), 4);
    }

    #[test]
    fn test_clone_is_independent() {
        let a = chain(2);
        let mut b = a.clone();
        b.add_unit(linear(4, 4));
        assert_eq!(a.num_units(), 2);
        assert_eq!(b.num_units(), 3);
        assert_eq!(a.units()[0], b.units()[0]);
    }

    #[test]
    fn test_summary() {
        let mut g = chain(2);
        assert!(g.summary().contains("2 units, 1 edges"));
        assert!(g.summary().contains("feed-forward"));
        g.add_edge(1, 0).unwrap();
        assert!(g.summary().contains("recurrent"));
    }

    #[test]
    fn test_display() {
        let g = chain(2);
        let display = format!("{g}");
        assert!(display.contains("[0] linear"));
        assert!(display.contains("0 -> 1"));
    }

    #[test]
    fn test_edge_conversions() {
        let e: Edge = (3, 4).into();
        assert_eq!(e, Edge::new(3, 4));
        assert_eq!(<(usize, usize)>::from(e), (3, 4));
        assert_eq!(e.to_string(), "(3, 4)");
    }

    #[test]
    fn test_serde_roundtrip() {
        let g = chain(3);
        let json = serde_json::to_string(&g).unwrap();
        assert!(json.contains("\"edges\":[[0,1],[1,2]]"));
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_deserialize_rejects_dangling_edge() {
        let mut json = serde_json::to_value(chain(2)).unwrap();
        json["edges"] = serde_json::json!([[0, 9]]);
        let result: Result<Graph, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Graph<Building>>();
        assert_send_sync::<Graph<Frozen>>();
    }
}
