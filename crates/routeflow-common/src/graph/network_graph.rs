// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Distribution network graph.
//!
//! Vertices are keyed by id; routes live in per-origin adjacency buckets in
//! insertion order. A secondary index maps persisted route ids to their origin
//! bucket so edits by id do not scan the whole graph.
//!
//! Endpoint validation is not performed here. Dangling routes are reported by
//! [`NetworkGraph::check_integrity`] and skipped by flow projection.

use crate::core::id::{RouteId, RouteKey, VertexId};
use crate::core::model::{Route, Vertex};
use fxhash::FxBuildHasher;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

type FxHashMap<K, V> = HashMap<K, V, FxBuildHasher>;

/// Non-fatal diagnostic produced by an integrity scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuralWarning {
    /// Vertex with no incident route in either direction.
    IsolatedVertex { id: VertexId, name: String },
    NonPositiveCapacity { key: RouteKey, route_id: Option<RouteId> },
    /// Route whose endpoint is not a known vertex.
    DanglingEndpoint { key: RouteKey, missing: VertexId },
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsolatedVertex { id, name } => write!(f, "Isolated vertex: {} ({})", name, id),
            Self::NonPositiveCapacity { key, .. } => {
                write!(f, "Non-positive capacity on route {}", key)
            }
            Self::DanglingEndpoint { key, missing } => {
                write!(f, "Route {} references unknown vertex {}", key, missing)
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NetworkGraph {
    vertices: FxHashMap<VertexId, Vertex>,
    /// origin -> routes, insertion order
    adjacency: FxHashMap<VertexId, Vec<Route>>,
    /// persisted route id -> origin bucket
    route_index: FxHashMap<RouteId, VertexId>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            vertices: HashMap::with_capacity_and_hasher(vertices, FxBuildHasher::default()),
            adjacency: HashMap::with_capacity_and_hasher(vertices, FxBuildHasher::default()),
            route_index: HashMap::default(),
        }
    }

    /// Inserts a vertex and ensures it has an adjacency bucket.
    ///
    /// On id collision the new vertex replaces the old one (its routes are
    /// kept). Returns `true` if the vertex was newly added.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        let id = vertex.id;
        self.adjacency.entry(id).or_default();
        match self.vertices.insert(id, vertex) {
            Some(previous) => {
                warn!(vertex = %id, previous = %previous.name, "DuplicateVertex: replaced existing vertex");
                false
            }
            None => true,
        }
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    #[inline]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// All vertices, unordered.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All vertices in ascending id order.
    pub fn sorted_vertices(&self) -> Vec<&Vertex> {
        let mut vertices: Vec<&Vertex> = self.vertices.values().collect();
        vertices.sort_unstable_by_key(|v| v.id);
        vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Removes a vertex together with every route that starts or ends at it.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        let vertex = self.vertices.remove(&id)?;
        let mut dropped: Vec<RouteId> = Vec::new();

        if let Some(outgoing) = self.adjacency.remove(&id) {
            dropped.extend(outgoing.iter().filter_map(|route| route.id));
        }
        for bucket in self.adjacency.values_mut() {
            bucket.retain(|route| {
                if route.destination != id {
                    return true;
                }
                dropped.extend(route.id);
                false
            });
        }

        for rid in dropped {
            self.reindex_route(rid);
        }
        Some(vertex)
    }

    /// Appends a route to its origin's bucket, creating the bucket if missing.
    pub fn add_route(&mut self, route: Route) {
        if let Some(rid) = route.id
            && let Some(previous) = self.route_index.insert(rid, route.origin)
        {
            warn!(route_id = %rid, previous_origin = %previous, "Route id reused; lookups resolve to the newest route");
        }
        self.adjacency.entry(route.origin).or_default().push(route);
    }

    /// Routes leaving `id`. Empty for unknown vertices.
    pub fn routes_from(&self, id: VertexId) -> &[Route] {
        self.adjacency.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Routes terminating at `id`, unordered.
    pub fn routes_into(&self, id: VertexId) -> impl Iterator<Item = &Route> {
        self.adjacency
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter(move |route| route.destination == id)
    }

    pub fn routes_into_mut(&mut self, id: VertexId) -> impl Iterator<Item = &mut Route> {
        self.adjacency
            .values_mut()
            .flat_map(|bucket| bucket.iter_mut())
            .filter(move |route| route.destination == id)
    }

    /// All routes: origins in ascending id order, each bucket in insertion order.
    pub fn routes(&self) -> Vec<&Route> {
        let mut origins: Vec<VertexId> = self.adjacency.keys().copied().collect();
        origins.sort_unstable();
        origins
            .into_iter()
            .flat_map(|origin| self.routes_from(origin).iter())
            .collect()
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        let origin = self.route_index.get(&id)?;
        self.adjacency
            .get(origin)?
            .iter()
            .rev()
            .find(|route| route.id == Some(id))
    }

    pub fn route_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        let origin = self.route_index.get(&id)?;
        self.adjacency
            .get_mut(origin)?
            .iter_mut()
            .rev()
            .find(|route| route.id == Some(id))
    }

    /// Removes the route indexed under `id`. Another route that carries the
    /// same id becomes reachable by id afterwards.
    pub fn remove_route(&mut self, id: RouteId) -> Option<Route> {
        let origin = *self.route_index.get(&id)?;
        let bucket = self.adjacency.get_mut(&origin)?;
        let pos = bucket.iter().rposition(|route| route.id == Some(id))?;
        let removed = bucket.remove(pos);
        self.reindex_route(id);
        Some(removed)
    }

    /// Points the index for `id` at the last remaining route carrying it, or
    /// drops the entry when none is left.
    fn reindex_route(&mut self, id: RouteId) {
        let survivor = self
            .routes()
            .into_iter()
            .rev()
            .find(|route| route.id == Some(id))
            .map(|route| route.origin);
        match survivor {
            Some(origin) => {
                self.route_index.insert(id, origin);
            }
            None => {
                self.route_index.remove(&id);
            }
        }
    }

    pub fn route_count(&self) -> usize {
        self.adjacency.values().map(|v| v.len()).sum()
    }

    /// Next free vertex id: one past the largest, or 0 for an empty graph.
    pub fn next_vertex_id(&self) -> VertexId {
        self.vertices
            .keys()
            .max()
            .map_or(VertexId(0), |id| VertexId(id.0 + 1))
    }

    /// Next free persisted route id: one past the largest, or 1 when none exist.
    pub fn next_route_id(&self) -> RouteId {
        self.adjacency
            .values()
            .flat_map(|bucket| bucket.iter().filter_map(|r| r.id))
            .max()
            .map_or(RouteId(1), |id| RouteId(id.0 + 1))
    }

    /// Scans for isolated vertices, non-positive capacities and dangling
    /// endpoints. Every finding is logged at `warn` and returned; the scan
    /// never fails.
    pub fn check_integrity(&self) -> Vec<StructuralWarning> {
        let mut warnings = Vec::new();
        let mut connected: HashSet<VertexId> = HashSet::new();

        for route in self.routes() {
            connected.insert(route.origin);
            connected.insert(route.destination);

            if route.capacity == 0 {
                warnings.push(StructuralWarning::NonPositiveCapacity {
                    key: route.key(),
                    route_id: route.id,
                });
            }
            for endpoint in [route.origin, route.destination] {
                if !self.contains_vertex(endpoint) {
                    warnings.push(StructuralWarning::DanglingEndpoint {
                        key: route.key(),
                        missing: endpoint,
                    });
                }
            }
        }

        for vertex in self.sorted_vertices() {
            if !connected.contains(&vertex.id) {
                warnings.push(StructuralWarning::IsolatedVertex {
                    id: vertex.id,
                    name: vertex.name.clone(),
                });
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        debug!(
            vertices = self.vertex_count(),
            routes = self.route_count(),
            warnings = warnings.len(),
            "Integrity check completed"
        );
        warnings
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.adjacency.clear();
        self.route_index.clear();
    }
}
