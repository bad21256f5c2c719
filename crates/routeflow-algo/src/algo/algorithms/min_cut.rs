// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Minimum source/sink cut, read off the drained residual network.

use crate::algo::algorithms::{Algorithm, FlowConfig, FlowSolver};
use crate::algo::FlowProjection;
use routeflow_common::core::id::VertexId;
use serde::Serialize;

pub struct MinCut;

/// Capacity crossing the cut from `origin` to `destination`, summed over
/// parallel routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CutArc {
    pub origin: VertexId,
    pub destination: VertexId,
    pub capacity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MinCutResult {
    pub max_flow: u64,
    pub cut_capacity: u64,
    /// Vertices still reachable from the sources after saturation.
    pub source_side: Vec<VertexId>,
    pub cut_arcs: Vec<CutArc>,
}

impl Algorithm for MinCut {
    type Config = FlowConfig;
    type Result = MinCutResult;

    fn name() -> &'static str {
        "min_cut"
    }

    fn run(projection: &FlowProjection, config: Self::Config) -> Self::Result {
        let solved = FlowSolver::run(projection, config);
        let residual = &solved.residual;
        let reachable = residual.reachable_from_source();

        let source_side: Vec<VertexId> = projection
            .vertices()
            .filter(|&(slot, _)| reachable[slot as usize])
            .map(|(_, id)| id)
            .collect();

        let mut cut_arcs = Vec::new();
        let mut cut_capacity = 0u64;
        for u in 0..residual.vertex_count() {
            if !reachable[u] {
                continue;
            }
            for &v in residual.neighbors(u) {
                let v = v as usize;
                let capacity = residual.capacity(u, v);
                if reachable[v] || residual.is_virtual(v) || capacity == 0 {
                    continue;
                }
                cut_capacity = cut_capacity.saturating_add(capacity);
                cut_arcs.push(CutArc {
                    origin: projection.to_vertex(u as u32),
                    destination: projection.to_vertex(v as u32),
                    capacity,
                });
            }
        }
        cut_arcs.sort_unstable_by_key(|arc| (arc.origin, arc.destination));

        MinCutResult {
            max_flow: solved.max_flow,
            cut_capacity,
            source_side,
            cut_arcs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::test_utils::{build_test_projection, flow_config};

    #[test]
    fn test_cut_matches_flow() {
        let projection =
            build_test_projection(&[1, 2, 3, 4], &[(1, 3, 5), (2, 3, 5), (3, 4, 8)]);
        let result = MinCut::run(&projection, flow_config(&[1, 2], &[4]));

        assert_eq!(result.max_flow, 8);
        assert_eq!(result.cut_capacity, 8);
        assert_eq!(
            result.cut_arcs,
            vec![CutArc {
                origin: VertexId(3),
                destination: VertexId(4),
                capacity: 8,
            }]
        );
        assert_eq!(
            result.source_side,
            vec![VertexId(1), VertexId(2), VertexId(3)]
        );
    }

    #[test]
    fn test_disconnected_cut_is_empty() {
        let projection = build_test_projection(&[1, 2], &[]);
        let result = MinCut::run(&projection, flow_config(&[1], &[2]));

        assert_eq!(result.max_flow, 0);
        assert_eq!(result.cut_capacity, 0);
        assert!(result.cut_arcs.is_empty());
    }
}
