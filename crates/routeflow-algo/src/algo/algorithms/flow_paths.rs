// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Flow path decomposition.
//!
//! `PathExtractor` never reads residual state produced by another run: it
//! builds a fresh residual network, saturates it with the same Edmonds-Karp
//! loop as [`FlowSolver`](super::FlowSolver), and then decomposes the net flow
//! into source-to-sink paths. Running it on an already drained network would
//! find no augmenting path and report zero paths.
//!
//! Decomposing the net flow instead of recording augmenting paths keeps every
//! hop on a real route: an augmenting path may traverse a reverse residual arc,
//! which cancels flow instead of carrying it.

use crate::algo::algorithms::{Algorithm, FlowConfig};
use crate::algo::residual::{ResidualNetwork, Terminals};
use crate::algo::FlowProjection;
use routeflow_common::core::id::VertexId;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, instrument};

pub struct PathExtractor;

/// One path of a flow decomposition. Hops are consecutive `(origin,
/// destination)` vertex pairs, from a source to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowPath {
    pub hops: Vec<(VertexId, VertexId)>,
    pub flow: u64,
}

impl FlowPath {
    /// Vertices visited, in order.
    pub fn vertices(&self) -> Vec<VertexId> {
        let mut vertices = Vec::with_capacity(self.hops.len() + 1);
        if let Some(&(first, _)) = self.hops.first() {
            vertices.push(first);
        }
        vertices.extend(self.hops.iter().map(|&(_, v)| v));
        vertices
    }

    pub fn source(&self) -> Option<VertexId> {
        self.hops.first().map(|&(u, _)| u)
    }

    pub fn sink(&self) -> Option<VertexId> {
        self.hops.last().map(|&(_, v)| v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowResult {
    pub max_flow: u64,
    pub paths: Vec<FlowPath>,
}

impl FlowResult {
    /// Sum of path flows. Equals `max_flow` for a complete decomposition.
    pub fn path_flow_total(&self) -> u64 {
        self.paths.iter().map(|p| p.flow).sum()
    }
}

impl Algorithm for PathExtractor {
    type Config = FlowConfig;
    type Result = FlowResult;

    fn name() -> &'static str {
        "flow_paths"
    }

    #[instrument(skip_all, fields(sources = config.sources.len(), sinks = config.sinks.len()))]
    fn run(projection: &FlowProjection, config: Self::Config) -> Self::Result {
        let terminals = Terminals::resolve(projection, &config.sources, &config.sinks);
        if terminals.is_empty() {
            return FlowResult::default();
        }

        let mut residual = ResidualNetwork::new(projection, &terminals);
        let max_flow = residual.saturate();
        let paths = decompose(projection, &residual);

        debug!(max_flow, paths = paths.len(), "Flow decomposed into paths");
        FlowResult { max_flow, paths }
    }
}

/// Splits the net flow of a saturated network into super-source to
/// super-sink paths, dropping the virtual hops.
fn decompose(projection: &FlowProjection, residual: &ResidualNetwork) -> Vec<FlowPath> {
    let n = residual.node_count();
    let (source, sink) = (residual.super_source(), residual.super_sink());

    let mut flow = vec![0u64; n * n];
    for u in 0..n {
        for &v in residual.neighbors(u) {
            flow[u * n + v as usize] = residual.net_flow(u, v as usize);
        }
    }

    let mut paths = Vec::new();
    loop {
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        visited[source] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            if u == sink {
                break;
            }
            for &v in residual.neighbors(u) {
                let v = v as usize;
                if !visited[v] && flow[u * n + v] > 0 {
                    visited[v] = true;
                    parent[v] = Some(u);
                    queue.push_back(v);
                }
            }
        }

        if !visited[sink] {
            break;
        }

        let mut nodes = vec![sink];
        let mut curr = sink;
        while let Some(prev) = parent[curr] {
            nodes.push(prev);
            curr = prev;
        }
        nodes.reverse();

        let amount = nodes
            .windows(2)
            .map(|w| flow[w[0] * n + w[1]])
            .min()
            .unwrap_or(0);
        if amount == 0 {
            break;
        }
        for w in nodes.windows(2) {
            flow[w[0] * n + w[1]] -= amount;
        }

        let hops: Vec<(VertexId, VertexId)> = nodes
            .windows(2)
            .filter(|w| !residual.is_virtual(w[0]) && !residual.is_virtual(w[1]))
            .map(|w| {
                (
                    projection.to_vertex(w[0] as u32),
                    projection.to_vertex(w[1] as u32),
                )
            })
            .collect();

        if !hops.is_empty() {
            paths.push(FlowPath { hops, flow: amount });
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::algorithms::FlowSolver;
    use crate::algo::test_utils::{build_test_projection, flow_config};

    fn ids(raw: &[u64]) -> Vec<VertexId> {
        raw.iter().copied().map(VertexId).collect()
    }

    #[test]
    fn test_single_path() {
        let projection = build_test_projection(&[1, 2, 3], &[(1, 2, 10), (2, 3, 7)]);
        let result = PathExtractor::run(&projection, flow_config(&[1], &[3]));

        assert_eq!(result.max_flow, 7);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].flow, 7);
        assert_eq!(result.paths[0].vertices(), ids(&[1, 2, 3]));
        assert_eq!(result.paths[0].source(), Some(VertexId(1)));
        assert_eq!(result.paths[0].sink(), Some(VertexId(3)));
    }

    #[test]
    fn test_decomposition_matches_solver() {
        let projection = build_test_projection(
            &[0, 1, 2, 3, 4, 5],
            &[
                (0, 1, 16),
                (0, 2, 13),
                (1, 3, 12),
                (2, 1, 4),
                (2, 4, 14),
                (3, 2, 9),
                (3, 5, 20),
                (4, 3, 7),
                (4, 5, 4),
            ],
        );
        let config = flow_config(&[0], &[5]);
        let solved = FlowSolver::run(&projection, config.clone());
        let extracted = PathExtractor::run(&projection, config);

        assert_eq!(extracted.max_flow, solved.max_flow);
        assert_eq!(extracted.path_flow_total(), 23);
        for path in &extracted.paths {
            assert_eq!(path.source(), Some(VertexId(0)));
            assert_eq!(path.sink(), Some(VertexId(5)));
            assert!(path.flow > 0);
        }
    }

    #[test]
    fn test_extractor_runs_on_fresh_state() {
        let projection = build_test_projection(&[1, 2], &[(1, 2, 4)]);
        let config = flow_config(&[1], &[2]);

        let _ = FlowSolver::run(&projection, config.clone());
        let first = PathExtractor::run(&projection, config.clone());
        let second = PathExtractor::run(&projection, config);

        assert_eq!(first.paths.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_paths_without_terminals() {
        let projection = build_test_projection(&[1, 2], &[(1, 2, 4)]);
        let result = PathExtractor::run(&projection, flow_config(&[2], &[1]));
        assert_eq!(result, FlowResult::default());
    }
}
