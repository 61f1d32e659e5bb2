// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Structural checks shared by graph construction and validation.
//!
//! Each check stops at the first violation.

use crate::{Edge, NirError, Unit};

/// Checks that both endpoints of `edge` lie in `[0, len)`.
pub(crate) fn check_edge(edge: Edge, len: usize) -> Result<(), NirError> {
    if edge.src >= len || edge.dst >= len {
        return Err(NirError::IndexError {
            src: edge.src,
            dst: edge.dst,
            len,
        });
    }
    Ok(())
}

pub(crate) fn check_edges(edges: &[Edge], len: usize) -> Result<(), NirError> {
    edges.iter().try_for_each(|&e| check_edge(e, len))
}

/// Checks that every edge carries as many channels as its destination
/// expects. Edges touching a width-polymorphic unit are skipped.
///
/// Assumes the edges have already passed [`check_edges`].
pub(crate) fn check_widths(units: &[Unit], edges: &[Edge]) -> Result<(), NirError> {
    for (i, edge) in edges.iter().enumerate() {
        let src = &units[edge.src];
        let dst = &units[edge.dst];
        if src.is_width_polymorphic() {
            continue;
        }
        let Some(expected) = dst.input_width() else {
            continue;
        };
        let produced = src.output_width();
        if produced != expected {
            return Err(NirError::shape(
                format!("edge {i} {edge}"),
                format!(
                    "{} at {} produces {produced} channels but {} at {} expects {expected}",
                    src.kind(),
                    edge.src,
                    dst.kind(),
                    edge.dst,
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Conv1d, ConvParams, LeakyIntegrator, Linear};
    use tensor_core::Tensor;

    fn linear(out: usize, inp: usize) -> Unit {
        Linear::new(Tensor::zeros([out, inp]), None).unwrap().into()
    }

    fn scalar_li() -> Unit {
        LeakyIntegrator::new(Tensor::scalar(0.02), Tensor::scalar(1.0), Tensor::scalar(0.0))
            .unwrap()
            .into()
    }

    #[test]
    fn test_check_edge_bounds() {
        assert!(check_edge(Edge::new(0, 1), 2).is_ok());
        assert!(check_edge(Edge::new(2, 0), 2).is_err());
        assert!(check_edge(Edge::new(0, 2), 2).is_err());
        assert!(check_edge(Edge::new(0, 0), 0).is_err());
    }

    #[test]
    fn test_check_edges_reports_first() {
        let edges = [Edge::new(0, 1), Edge::new(0, 4), Edge::new(5, 0)];
        let err = check_edges(&edges, 2).unwrap_err();
        assert_eq!(err, NirError::IndexError { src: 0, dst: 4, len: 2 });
    }

    #[test]
    fn test_widths_match() {
        let units = [linear(3, 2), linear(4, 3)];
        check_widths(&units, &[Edge::new(0, 1)]).unwrap();
    }

    #[test]
    fn test_widths_mismatch() {
        let units = [linear(3, 2), linear(4, 3)];
        let err = check_widths(&units, &[Edge::new(1, 0)]).unwrap_err();
        match err {
            NirError::ShapeError { context, detail } => {
                assert_eq!(context, "edge 0 (1, 0)");
                assert!(detail.contains("produces 4 channels"));
                assert!(detail.contains("expects 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_linear_into_conv() {
        let conv: Unit = Conv1d::new(Tensor::zeros([2, 3, 3]), ConvParams::default(), None)
            .unwrap()
            .into();
        let units = [linear(2, 2), conv];
        assert!(check_widths(&units, &[Edge::new(0, 1)]).is_err());
    }

    #[test]
    fn test_polymorphic_units_are_skipped() {
        let units = [linear(3, 2), scalar_li(), linear(4, 5)];
        check_widths(&units, &[Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
    }

    #[test]
    fn test_self_loop_width() {
        let units = [linear(3, 3), linear(2, 3)];
        check_widths(&units, &[Edge::new(0, 0)]).unwrap();
        assert!(check_widths(&units, &[Edge::new(1, 1)]).is_err());
    }
}
