// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Edge-state mutations: blocking, route edits, route addition and demand
//! increases.
//!
//! Every operation validates its inputs before touching the graph, so a
//! rejected call has no partial effect.

use routeflow_common::core::blocked::BlockedSet;
use routeflow_common::core::id::{RouteId, RouteKey, VertexId};
use routeflow_common::core::model::{Route, RouteEdit};
use routeflow_common::graph::network_graph::NetworkGraph;
use routeflow_common::{Result, RouteflowError};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of a block toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockToggle {
    pub key: RouteKey,
    /// State after the toggle.
    pub blocked: bool,
}

impl BlockToggle {
    /// `"origin-destination"`
    pub fn canonical_key(&self) -> String {
        self.key.to_string()
    }
}

/// Mutating view over a graph and its blocked set.
pub struct EdgeStateManager<'a> {
    graph: &'a mut NetworkGraph,
    blocked: &'a mut BlockedSet,
}

impl<'a> EdgeStateManager<'a> {
    pub fn new(graph: &'a mut NetworkGraph, blocked: &'a mut BlockedSet) -> Self {
        Self { graph, blocked }
    }

    /// Flips the blocked state of `origin -> destination`. Route data is not
    /// touched, and keys without a matching route may be blocked too.
    pub fn toggle_block(&mut self, origin: VertexId, destination: VertexId) -> BlockToggle {
        let key = RouteKey::new(origin, destination);
        let blocked = self.blocked.toggle(key);

        if !self.graph.routes_from(origin).iter().any(|r| r.destination == destination) {
            debug!(%key, "Toggled block on a key with no route");
        }
        info!(%key, blocked, "Route block toggled");

        BlockToggle { key, blocked }
    }

    /// Applies `edit` to the route carrying persisted id `id`.
    pub fn edit_edge(&mut self, id: RouteId, edit: &RouteEdit) -> Result<Route> {
        let route = self
            .graph
            .route_mut(id)
            .ok_or(RouteflowError::RouteNotFound { id })?;
        edit.apply_to(route)?;

        debug!(route_id = %id, ?edit, "Route edited");
        Ok(route.clone())
    }

    /// Adds a route with the next free persisted id.
    pub fn add_route(
        &mut self,
        origin: VertexId,
        destination: VertexId,
        capacity: u64,
        usage: u64,
    ) -> Result<Route> {
        if capacity == 0 {
            return Err(RouteflowError::invalid_input(
                "Route capacity must be positive",
            ));
        }
        for endpoint in [origin, destination] {
            if !self.graph.contains_vertex(endpoint) {
                return Err(RouteflowError::invalid_input(format!(
                    "Route endpoint {} is not a known vertex",
                    endpoint
                )));
            }
        }

        let id = self.graph.next_route_id();
        let route = Route::new(origin, destination, capacity)
            .with_id(id)
            .with_usage(usage);
        self.graph.add_route(route.clone());

        info!(route_id = %id, key = %route.key(), capacity, "Route added");
        Ok(route)
    }

    /// Adds `step` to the capacity of every route into `node`. Returns the
    /// updated routes ordered by origin, then id.
    pub fn increase_demand(&mut self, node: VertexId, step: u64) -> Result<Vec<Route>> {
        if !self.graph.contains_vertex(node) {
            return Err(RouteflowError::VertexNotFound { id: node });
        }

        let mut updated: Vec<Route> = self
            .graph
            .routes_into_mut(node)
            .map(|route| {
                route.capacity = route.capacity.saturating_add(step);
                route.clone()
            })
            .collect();
        updated.sort_by_key(|r| (r.origin, r.id));

        info!(node = %node, step, routes = updated.len(), "Demand increased");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeflow_common::core::model::Vertex;

    fn sample() -> (NetworkGraph, BlockedSet) {
        let mut graph = NetworkGraph::new();
        graph.add_vertex(Vertex::depot(1, "D1"));
        graph.add_vertex(Vertex::hub(2, "H1"));
        graph.add_vertex(Vertex::delivery_zone(3, "Z1"));
        graph.add_route(Route::new(1, 2, 10).with_id(1));
        graph.add_route(Route::new(2, 3, 7).with_id(2));
        (graph, BlockedSet::new())
    }

    #[test]
    fn test_toggle_block_is_an_overlay() {
        let (mut graph, mut blocked) = sample();
        let mut edges = EdgeStateManager::new(&mut graph, &mut blocked);

        let toggle = edges.toggle_block(VertexId(2), VertexId(3));
        assert!(toggle.blocked);
        assert_eq!(toggle.canonical_key(), "2-3");
        assert!(!edges.toggle_block(VertexId(2), VertexId(3)).blocked);
        edges.toggle_block(VertexId(2), VertexId(3));

        assert!(blocked.is_blocked(VertexId(2), VertexId(3)));
        assert_eq!(graph.route(RouteId(2)).unwrap().capacity, 7);
    }

    #[test]
    fn test_edit_unknown_edge_is_not_found() {
        let (mut graph, mut blocked) = sample();
        let before = graph.routes().into_iter().cloned().collect::<Vec<_>>();

        let err = EdgeStateManager::new(&mut graph, &mut blocked)
            .edit_edge(RouteId(42), &RouteEdit::usage(3))
            .unwrap_err();
        assert!(err.is_not_found());

        let after = graph.routes().into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn test_edit_edge_updates_supplied_fields() {
        let (mut graph, mut blocked) = sample();
        let route = EdgeStateManager::new(&mut graph, &mut blocked)
            .edit_edge(RouteId(1), &RouteEdit::priority(4))
            .unwrap();

        assert_eq!(route.priority.value(), 4);
        assert_eq!(route.usage, 0);
        assert_eq!(graph.route(RouteId(1)).unwrap().priority.value(), 4);
    }

    #[test]
    fn test_add_route_validates_before_mutating() {
        let (mut graph, mut blocked) = sample();
        let mut edges = EdgeStateManager::new(&mut graph, &mut blocked);

        assert!(edges.add_route(VertexId(1), VertexId(3), 0, 0).unwrap_err().is_invalid_input());
        assert!(edges.add_route(VertexId(1), VertexId(9), 5, 0).unwrap_err().is_invalid_input());

        let route = edges.add_route(VertexId(1), VertexId(3), 6, 2).unwrap();
        assert_eq!(route.id, Some(RouteId(3)));
        assert_eq!(route.usage, 2);
        assert_eq!(graph.route_count(), 3);
    }

    #[test]
    fn test_increase_demand() {
        let (mut graph, mut blocked) = sample();
        graph.add_route(Route::new(1, 3, 4).with_id(3));
        let mut edges = EdgeStateManager::new(&mut graph, &mut blocked);

        let updated = edges.increase_demand(VertexId(3), 5).unwrap();
        let caps: Vec<u64> = updated.iter().map(|r| r.capacity).collect();
        assert_eq!(caps, vec![9, 12]);

        assert!(edges.increase_demand(VertexId(1), 5).unwrap().is_empty());
        assert!(edges.increase_demand(VertexId(8), 5).unwrap_err().is_not_found());
    }
}
