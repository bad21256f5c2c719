// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Flow Projection - Dense CSR snapshot of the active network.
//!
//! A `FlowProjection` is a materialized, algorithm-optimized copy of the
//! network graph with blocked routes already removed. It provides:
//! - Dense vertex indexing (0..V), slots assigned in ascending vertex id order
//! - CSR format with one arc per active route and its capacity
//! - The total active capacity, used to size the super-source/sink sentinel
//!
//! Building a projection only borrows the graph, so callers holding a lock can
//! release it as soon as `build` returns. Algorithms never see the graph itself.

use crate::algo::IdMap;
use routeflow_common::core::blocked::BlockedSet;
use routeflow_common::core::id::VertexId;
use routeflow_common::graph::network_graph::NetworkGraph;
use tracing::debug;

/// Arc list for CSR construction: (origin_slot, destination_slot, capacity).
type CapacityArcList = Vec<(u32, u32, u64)>;

/// Dense CSR representation of the active routes.
#[derive(Debug, Clone)]
pub struct FlowProjection {
    pub(crate) vertex_count: usize,

    pub(crate) out_offsets: Vec<u32>,    // [V+1] vertex slot -> arc start
    pub(crate) out_neighbors: Vec<u32>,  // [E] destination slots
    pub(crate) out_capacities: Vec<u64>, // [E]

    pub(crate) id_map: IdMap,

    /// Sum of capacities over every arc in the projection.
    pub(crate) total_capacity: u64,
}

impl FlowProjection {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of active routes in the projection.
    #[inline]
    pub fn arc_count(&self) -> usize {
        self.out_neighbors.len()
    }

    #[inline]
    pub fn total_capacity(&self) -> u64 {
        self.total_capacity
    }

    /// Outbound neighbors of a vertex (by slot). Parallel routes appear once each.
    #[inline]
    pub fn out_neighbors(&self, slot: u32) -> &[u32] {
        let start = self.out_offsets[slot as usize] as usize;
        let end = self.out_offsets[slot as usize + 1] as usize;
        &self.out_neighbors[start..end]
    }

    /// Capacities aligned with [`out_neighbors`](Self::out_neighbors).
    #[inline]
    pub fn out_capacities(&self, slot: u32) -> &[u64] {
        let start = self.out_offsets[slot as usize] as usize;
        let end = self.out_offsets[slot as usize + 1] as usize;
        &self.out_capacities[start..end]
    }

    /// Iterate over every arc as (origin_slot, destination_slot, capacity).
    pub fn arcs(&self) -> impl Iterator<Item = (u32, u32, u64)> + '_ {
        (0..self.vertex_count as u32).flat_map(move |u| {
            self.out_neighbors(u)
                .iter()
                .zip(self.out_capacities(u))
                .map(move |(&v, &cap)| (u, v, cap))
        })
    }

    /// Map slot back to vertex id.
    #[inline]
    pub fn to_vertex(&self, slot: u32) -> VertexId {
        self.id_map.to_vertex_unchecked(slot)
    }

    #[inline]
    pub fn to_slot(&self, id: VertexId) -> Option<u32> {
        self.id_map.to_slot(id)
    }

    /// Iterate over all vertices as (slot, id), ascending.
    pub fn vertices(&self) -> impl Iterator<Item = (u32, VertexId)> + '_ {
        self.id_map.iter()
    }
}

/// Builder for flow projections.
pub struct ProjectionBuilder<'a> {
    graph: &'a NetworkGraph,
    blocked: Option<&'a BlockedSet>,
}

impl<'a> ProjectionBuilder<'a> {
    pub fn new(graph: &'a NetworkGraph) -> Self {
        Self {
            graph,
            blocked: None,
        }
    }

    /// Exclude routes whose key is in `blocked`.
    pub fn blocked(mut self, blocked: &'a BlockedSet) -> Self {
        self.blocked = Some(blocked);
        self
    }

    pub fn build(self) -> FlowProjection {
        let id_map: IdMap = self.graph.vertices().map(|v| v.id).collect();
        let vertex_count = id_map.len();

        let mut arcs: CapacityArcList = Vec::with_capacity(self.graph.route_count());
        let mut skipped_blocked = 0usize;
        let mut skipped_dangling = 0usize;

        for route in self.graph.routes() {
            if self.blocked.is_some_and(|b| !b.is_active(route)) {
                skipped_blocked += 1;
                continue;
            }
            let (Some(u), Some(v)) = (id_map.to_slot(route.origin), id_map.to_slot(route.destination))
            else {
                debug!(route = %route.key(), "Skipping route with unknown endpoint");
                skipped_dangling += 1;
                continue;
            };
            if route.capacity == 0 {
                continue;
            }
            arcs.push((u, v, route.capacity));
        }

        let total_capacity = arcs
            .iter()
            .fold(0u64, |acc, &(_, _, cap)| acc.saturating_add(cap));
        let (out_offsets, out_neighbors, out_capacities) = build_csr(vertex_count, &arcs);

        debug!(
            vertices = vertex_count,
            arcs = out_neighbors.len(),
            skipped_blocked,
            skipped_dangling,
            total_capacity,
            "Flow projection built"
        );

        FlowProjection {
            vertex_count,
            out_offsets,
            out_neighbors,
            out_capacities,
            id_map,
            total_capacity,
        }
    }
}

/// Stable counting sort into CSR: arcs of one origin keep their input order.
fn build_csr(vertex_count: usize, arcs: &[(u32, u32, u64)]) -> (Vec<u32>, Vec<u32>, Vec<u64>) {
    let mut degrees = vec![0u32; vertex_count];
    for &(src, _, _) in arcs {
        degrees[src as usize] += 1;
    }

    let mut offsets = vec![0u32; vertex_count + 1];
    for i in 0..vertex_count {
        offsets[i + 1] = offsets[i] + degrees[i];
    }

    let mut neighbors = vec![0u32; arcs.len()];
    let mut capacities = vec![0u64; arcs.len()];
    let mut current = offsets.clone();

    for &(src, dst, cap) in arcs {
        let idx = current[src as usize] as usize;
        neighbors[idx] = dst;
        capacities[idx] = cap;
        current[src as usize] += 1;
    }

    (offsets, neighbors, capacities)
}
