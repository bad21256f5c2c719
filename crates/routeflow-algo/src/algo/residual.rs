// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Residual network over a flow projection extended with a super-source and
//! a super-sink.
//!
//! Node layout: slots `0..V` are the projection's vertices, slot `V` is the
//! super-source and slot `V + 1` the super-sink. The super-source has an arc
//! of sentinel capacity to every source, every sink has one to the super-sink.
//! The sentinel is one more than the total active capacity, so the virtual
//! arcs can never be the binding constraint.
//!
//! Capacities are stored in a dense `(V+2) x (V+2)` matrix. Parallel routes
//! between the same pair of vertices accumulate into one cell.

use crate::algo::FlowProjection;
use routeflow_common::core::id::VertexId;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Source and sink slots resolved against a projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terminals {
    pub sources: Vec<u32>,
    pub sinks: Vec<u32>,
}

impl Terminals {
    /// Maps vertex ids to slots.
    ///
    /// Ids that are not in the projection are ignored. A vertex listed as both
    /// source and sink is kept as a source only. Output slots are sorted and
    /// deduplicated.
    pub fn resolve(projection: &FlowProjection, sources: &[VertexId], sinks: &[VertexId]) -> Self {
        let to_slots = |ids: &[VertexId], role: &str| -> Vec<u32> {
            let mut slots: Vec<u32> = ids
                .iter()
                .filter_map(|&id| {
                    let slot = projection.to_slot(id);
                    if slot.is_none() {
                        debug!(vertex = %id, role, "Ignoring unknown terminal vertex");
                    }
                    slot
                })
                .collect();
            slots.sort_unstable();
            slots.dedup();
            slots
        };

        let sources = to_slots(sources, "source");
        let mut sinks = to_slots(sinks, "sink");

        sinks.retain(|slot| {
            let overlap = sources.binary_search(slot).is_ok();
            if overlap {
                warn!(
                    vertex = %projection.to_vertex(*slot),
                    "Vertex is both source and sink; treating it as a source only"
                );
            }
            !overlap
        });

        Self { sources, sinks }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() || self.sinks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ResidualNetwork {
    /// Real vertex count; virtual terminals live at `V` and `V + 1`.
    vertex_count: usize,
    node_count: usize,
    sentinel: u64,

    /// Initial capacities, row-major `[node_count * node_count]`
    capacity: Vec<u64>,
    /// Remaining capacities, same layout
    residual: Vec<u64>,
    /// Every node adjacent in either direction, in insertion order
    neighbors: Vec<Vec<u32>>,

    augmentations: usize,
}

impl ResidualNetwork {
    /// Fresh residual network with zero flow.
    pub fn new(projection: &FlowProjection, terminals: &Terminals) -> Self {
        let vertex_count = projection.vertex_count();
        let node_count = vertex_count + 2;
        let sentinel = projection.total_capacity().saturating_add(1);

        let mut network = Self {
            vertex_count,
            node_count,
            sentinel,
            capacity: vec![0; node_count * node_count],
            residual: vec![0; node_count * node_count],
            neighbors: vec![Vec::new(); node_count],
            augmentations: 0,
        };

        for (u, v, cap) in projection.arcs() {
            network.add_arc(u as usize, v as usize, cap);
        }

        let (super_source, super_sink) = (network.super_source(), network.super_sink());
        for &s in &terminals.sources {
            network.add_arc(super_source, s as usize, sentinel);
        }
        for &t in &terminals.sinks {
            network.add_arc(t as usize, super_sink, sentinel);
        }

        network
    }

    fn add_arc(&mut self, u: usize, v: usize, cap: u64) {
        if cap == 0 || u == v {
            return;
        }
        let (uv, vu) = (self.idx(u, v), self.idx(v, u));
        if self.capacity[uv] == 0 && self.capacity[vu] == 0 {
            self.neighbors[u].push(v as u32);
            self.neighbors[v].push(u as u32);
        }
        self.capacity[uv] = self.capacity[uv].saturating_add(cap);
        self.residual[uv] = self.residual[uv].saturating_add(cap);
    }

    #[inline]
    fn idx(&self, u: usize, v: usize) -> usize {
        u * self.node_count + v
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[inline]
    pub fn super_source(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn super_sink(&self) -> usize {
        self.vertex_count + 1
    }

    /// True for the super-source and super-sink.
    #[inline]
    pub fn is_virtual(&self, node: usize) -> bool {
        node >= self.vertex_count
    }

    #[inline]
    pub fn sentinel(&self) -> u64 {
        self.sentinel
    }

    #[inline]
    pub fn augmentations(&self) -> usize {
        self.augmentations
    }

    #[inline]
    pub fn neighbors(&self, node: usize) -> &[u32] {
        &self.neighbors[node]
    }

    #[inline]
    pub fn capacity(&self, u: usize, v: usize) -> u64 {
        self.capacity[self.idx(u, v)]
    }

    #[inline]
    pub fn residual(&self, u: usize, v: usize) -> u64 {
        self.residual[self.idx(u, v)]
    }

    /// Flow carried on `u -> v`, net of flow pushed back along `v -> u`.
    #[inline]
    pub fn net_flow(&self, u: usize, v: usize) -> u64 {
        self.capacity(u, v).saturating_sub(self.residual(u, v))
    }

    /// Total flow leaving the super-source.
    pub fn flow_value(&self) -> u64 {
        let s = self.super_source();
        self.neighbors[s]
            .iter()
            .map(|&v| self.net_flow(s, v as usize))
            .sum()
    }

    /// Shortest augmenting path from super-source to super-sink, as a node
    /// sequence. `None` once the flow is maximum.
    fn shortest_augmenting_path(&self) -> Option<Vec<usize>> {
        let (source, sink) = (self.super_source(), self.super_sink());
        let mut parent: Vec<Option<usize>> = vec![None; self.node_count];
        let mut visited = vec![false; self.node_count];
        let mut queue = VecDeque::new();

        visited[source] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            if u == sink {
                break;
            }
            for &v in &self.neighbors[u] {
                let v = v as usize;
                if !visited[v] && self.residual(u, v) > 0 {
                    visited[v] = true;
                    parent[v] = Some(u);
                    queue.push_back(v);
                }
            }
        }

        if !visited[sink] {
            return None;
        }

        let mut path = vec![sink];
        let mut curr = sink;
        while let Some(prev) = parent[curr] {
            path.push(prev);
            curr = prev;
        }
        path.reverse();
        Some(path)
    }

    /// Pushes flow along one shortest augmenting path. Returns the path and
    /// its bottleneck, or `None` when no augmenting path remains.
    pub fn augment(&mut self) -> Option<(Vec<usize>, u64)> {
        let path = self.shortest_augmenting_path()?;

        let bottleneck = path
            .windows(2)
            .map(|w| self.residual(w[0], w[1]))
            .min()
            .unwrap_or(0);
        if bottleneck == 0 {
            return None;
        }

        for w in path.windows(2) {
            let (uv, vu) = (self.idx(w[0], w[1]), self.idx(w[1], w[0]));
            self.residual[uv] -= bottleneck;
            self.residual[vu] = self.residual[vu].saturating_add(bottleneck);
        }
        self.augmentations += 1;
        trace!(hops = path.len() - 1, bottleneck, "Augmented");

        Some((path, bottleneck))
    }

    /// Augments until no path remains. Returns the flow added by this call.
    pub fn saturate(&mut self) -> u64 {
        let mut added = 0u64;
        while let Some((_, bottleneck)) = self.augment() {
            added = added.saturating_add(bottleneck);
        }
        debug!(
            flow = added,
            augmentations = self.augmentations,
            nodes = self.node_count,
            "Residual network saturated"
        );
        added
    }

    /// Nodes reachable from the super-source over arcs with positive residual.
    pub fn reachable_from_source(&self) -> Vec<bool> {
        let mut visited = vec![false; self.node_count];
        let mut queue = VecDeque::new();
        let source = self.super_source();
        visited[source] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &v in &self.neighbors[u] {
                let v = v as usize;
                if !visited[v] && self.residual(u, v) > 0 {
                    visited[v] = true;
                    queue.push_back(v);
                }
            }
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::test_utils::build_test_projection;

    #[test]
    fn test_sentinel_exceeds_total_capacity() {
        let projection = build_test_projection(&[1, 2, 3], &[(1, 2, 4), (2, 3, 6)]);
        let terminals = Terminals::resolve(&projection, &[VertexId(1)], &[VertexId(3)]);
        let network = ResidualNetwork::new(&projection, &terminals);

        assert_eq!(network.node_count(), 5);
        assert_eq!(network.sentinel(), 11);
        assert_eq!(network.capacity(network.super_source(), 0), 11);
        assert_eq!(network.capacity(2, network.super_sink()), 11);
    }

    #[test]
    fn test_parallel_arcs_accumulate() {
        let projection = build_test_projection(&[1, 2], &[(1, 2, 4), (1, 2, 3)]);
        let terminals = Terminals::resolve(&projection, &[VertexId(1)], &[VertexId(2)]);
        let mut network = ResidualNetwork::new(&projection, &terminals);

        assert_eq!(network.capacity(0, 1), 7);
        assert_eq!(network.neighbors(0).iter().filter(|&&v| v == 1).count(), 1);
        assert_eq!(network.saturate(), 7);
        assert_eq!(network.flow_value(), 7);
        assert_eq!(network.net_flow(0, 1), 7);
    }

    #[test]
    fn test_antiparallel_arcs_net_flow() {
        // 1 -> 2 -> 3 with a back route 2 -> 1
        let projection = build_test_projection(&[1, 2, 3], &[(1, 2, 5), (2, 1, 4), (2, 3, 3)]);
        let terminals = Terminals::resolve(&projection, &[VertexId(1)], &[VertexId(3)]);
        let mut network = ResidualNetwork::new(&projection, &terminals);

        assert_eq!(network.saturate(), 3);
        assert_eq!(network.net_flow(0, 1), 3);
        assert_eq!(network.net_flow(1, 0), 0);
    }

    #[test]
    fn test_terminal_resolution() {
        let projection = build_test_projection(&[1, 2, 3], &[(1, 2, 1)]);
        let terminals = Terminals::resolve(
            &projection,
            &[VertexId(3), VertexId(1), VertexId(1), VertexId(77)],
            &[VertexId(1), VertexId(2)],
        );

        assert_eq!(terminals.sources, vec![0, 2]);
        assert_eq!(terminals.sinks, vec![1]);
        assert!(!terminals.is_empty());

        let none = Terminals::resolve(&projection, &[VertexId(1)], &[VertexId(1)]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_empty_terminals_carry_no_flow() {
        let projection = build_test_projection(&[1, 2], &[(1, 2, 9)]);
        let mut network = ResidualNetwork::new(&projection, &Terminals::default());
        assert!(network.augment().is_none());
        assert_eq!(network.flow_value(), 0);
    }
}
