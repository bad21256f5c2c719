// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use crate::api::edge_state::{BlockToggle, EdgeStateManager};
use crate::api::import::BulkImport;
use crate::api::report::{FlowRoles, Report, ReportGenerator};
use parking_lot::RwLock;
use rand::Rng;
use routeflow_algo::{Algorithm, FlowResult, MinCut, MinCutResult, PathExtractor, ProjectionBuilder};
use routeflow_common::config::RouteflowConfig;
use routeflow_common::core::blocked::BlockedSet;
use routeflow_common::core::id::{RouteId, RouteKey, VertexId};
use routeflow_common::core::model::{Route, RouteEdit, Vertex, VertexKind};
use routeflow_common::graph::network_graph::{NetworkGraph, StructuralWarning};
use routeflow_common::{Result, RouteflowError};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Graph plus blocked overlay. Always mutated together under one lock.
#[derive(Debug, Clone, Default)]
pub struct NetworkState {
    pub graph: NetworkGraph,
    pub blocked: BlockedSet,
}

impl NetworkState {
    /// Fixed starting topology: one depot, one hub, one delivery zone, no routes.
    pub fn initial() -> Self {
        let mut graph = NetworkGraph::with_capacity(3);
        graph.add_vertex(Vertex::depot(0, "Main Depot"));
        graph.add_vertex(Vertex::hub(1, "Central Hub"));
        graph.add_vertex(Vertex::delivery_zone(2, "Delivery Zone 1"));
        Self {
            graph,
            blocked: BlockedSet::new(),
        }
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            vertices: self.graph.sorted_vertices().into_iter().cloned().collect(),
            routes: self.graph.routes().into_iter().cloned().collect(),
            blocked: self.blocked.to_strings(),
        }
    }
}

/// Serializable copy of the whole network state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSnapshot {
    /// Ascending id order
    pub vertices: Vec<Vertex>,
    /// Origins ascending, each origin's routes in insertion order
    pub routes: Vec<Route>,
    /// Canonical keys, sorted
    pub blocked: Vec<String>,
}

/// Owns the network state and exposes every network operation.
///
/// Mutations take the write lock and validate before changing anything.
/// Flow computations copy what they need under the read lock and compute
/// after releasing it, so solves never block mutators for long.
///
/// # Example
///
/// ```no_run
/// use routeflow::{NetworkService, RouteflowConfig, VertexId};
///
/// let service = NetworkService::new(RouteflowConfig::default());
/// service.add_route(VertexId(0), VertexId(1), 10, 0)?;
/// service.add_route(VertexId(1), VertexId(2), 7, 0)?;
///
/// let report = service.generate_report(None);
/// assert_eq!(report.max_flow, 7);
/// # Ok::<(), routeflow::RouteflowError>(())
/// ```
pub struct NetworkService {
    state: RwLock<NetworkState>,
    reports: ReportGenerator,
    config: RouteflowConfig,
}

impl NetworkService {
    /// Service over the initial topology.
    pub fn new(config: RouteflowConfig) -> Self {
        Self::with_state(NetworkState::initial(), config)
    }

    pub fn from_graph(graph: NetworkGraph, config: RouteflowConfig) -> Self {
        Self::with_state(
            NetworkState {
                graph,
                blocked: BlockedSet::new(),
            },
            config,
        )
    }

    pub fn with_state(state: NetworkState, config: RouteflowConfig) -> Self {
        Self {
            state: RwLock::new(state),
            reports: ReportGenerator::new(config.report.clone()),
            config,
        }
    }

    pub fn config(&self) -> &RouteflowConfig {
        &self.config
    }

    pub fn current_state(&self) -> NetworkSnapshot {
        self.state.read().snapshot()
    }

    /// Runs `f` with shared access to the state.
    pub fn read<T>(&self, f: impl FnOnce(&NetworkState) -> T) -> T {
        f(&self.state.read())
    }

    // ---- Edge state ----

    #[instrument(skip(self))]
    pub fn toggle_block(&self, origin: VertexId, destination: VertexId) -> BlockToggle {
        let mut state = self.state.write();
        let NetworkState { graph, blocked } = &mut *state;
        EdgeStateManager::new(graph, blocked).toggle_block(origin, destination)
    }

    /// Forces `key` into the given state. Returns `true` if the state changed.
    pub fn set_blocked(&self, key: RouteKey, blocked: bool) -> bool {
        let mut state = self.state.write();
        let changed = if blocked {
            state.blocked.block(key)
        } else {
            state.blocked.unblock(key)
        };
        debug!(%key, blocked, changed, "Block state set");
        changed
    }

    #[instrument(skip(self, edit))]
    pub fn edit_edge(&self, id: RouteId, edit: &RouteEdit) -> Result<Route> {
        let mut state = self.state.write();
        let NetworkState { graph, blocked } = &mut *state;
        EdgeStateManager::new(graph, blocked).edit_edge(id, edit)
    }

    #[instrument(skip(self))]
    pub fn add_route(
        &self,
        origin: VertexId,
        destination: VertexId,
        capacity: u64,
        usage: u64,
    ) -> Result<Route> {
        let mut state = self.state.write();
        let NetworkState { graph, blocked } = &mut *state;
        EdgeStateManager::new(graph, blocked).add_route(origin, destination, capacity, usage)
    }

    /// Raises every route into `node` by the configured demand step.
    #[instrument(skip(self))]
    pub fn increase_demand(&self, node: VertexId) -> Result<Vec<Route>> {
        let mut state = self.state.write();
        let NetworkState { graph, blocked } = &mut *state;
        EdgeStateManager::new(graph, blocked).increase_demand(node, self.config.demand.step)
    }

    /// Toggles the key of one uniformly chosen route. Returns `None` when the
    /// graph has no routes.
    pub fn toggle_random_route<R: Rng>(&self, rng: &mut R) -> Option<BlockToggle> {
        let mut state = self.state.write();
        let NetworkState { graph, blocked } = &mut *state;

        let keys: Vec<RouteKey> = graph.routes().into_iter().map(Route::key).collect();
        if keys.is_empty() {
            return None;
        }
        let key = keys[rng.gen_range(0..keys.len())];
        Some(EdgeStateManager::new(graph, blocked).toggle_block(key.origin, key.destination))
    }

    // ---- Vertices ----

    /// Inserts or replaces a vertex. Returns `true` if it was new.
    pub fn add_vertex(&self, vertex: Vertex) -> bool {
        self.state.write().graph.add_vertex(vertex)
    }

    pub fn vertex(&self, id: VertexId) -> Result<Vertex> {
        self.state
            .read()
            .graph
            .vertex(id)
            .cloned()
            .ok_or(RouteflowError::VertexNotFound { id })
    }

    pub fn update_vertex(
        &self,
        id: VertexId,
        name: Option<String>,
        kind: Option<VertexKind>,
    ) -> Result<Vertex> {
        let mut state = self.state.write();
        let vertex = state
            .graph
            .vertex_mut(id)
            .ok_or(RouteflowError::VertexNotFound { id })?;
        if let Some(name) = name {
            vertex.name = name;
        }
        if let Some(kind) = kind {
            vertex.kind = kind;
        }
        Ok(vertex.clone())
    }

    /// Removes a vertex and every route touching it.
    #[instrument(skip(self))]
    pub fn remove_vertex(&self, id: VertexId) -> Result<Vertex> {
        let removed = self
            .state
            .write()
            .graph
            .remove_vertex(id)
            .ok_or(RouteflowError::VertexNotFound { id })?;
        info!(name = %removed.name, "Vertex removed");
        Ok(removed)
    }

    // ---- Routes ----

    pub fn route(&self, id: RouteId) -> Result<Route> {
        self.state
            .read()
            .graph
            .route(id)
            .cloned()
            .ok_or(RouteflowError::RouteNotFound { id })
    }

    pub fn remove_route(&self, id: RouteId) -> Result<Route> {
        let removed = self
            .state
            .write()
            .graph
            .remove_route(id)
            .ok_or(RouteflowError::RouteNotFound { id })?;
        info!(route_id = %id, key = %removed.key(), "Route removed");
        Ok(removed)
    }

    // ---- Whole network ----

    /// Restores the initial topology and clears every block.
    #[instrument(skip(self))]
    pub fn reset(&self) -> NetworkSnapshot {
        let mut state = self.state.write();
        *state = NetworkState::initial();
        info!("Network reset to initial topology");
        state.snapshot()
    }

    /// Replaces the graph with an import and clears every block.
    pub fn load_import(&self, import: BulkImport) {
        let skipped = import.skipped;
        let graph = import.into_graph();
        let (vertices, routes) = (graph.vertex_count(), graph.route_count());

        let mut state = self.state.write();
        state.graph = graph;
        state.blocked.clear();
        info!(vertices, routes, skipped, "Network replaced from import");
    }

    pub fn check_integrity(&self) -> Vec<StructuralWarning> {
        self.state.read().graph.check_integrity()
    }

    // ---- Flow ----

    /// Report over the current state. `roles` defaults to depots as sources
    /// and delivery zones as sinks.
    #[instrument(skip(self, roles))]
    pub fn generate_report(&self, roles: Option<FlowRoles>) -> Report {
        let input = {
            let state = self.state.read();
            self.reports.snapshot(&state.graph, &state.blocked, roles)
        };
        self.reports.compute(input)
    }

    /// Max flow and its path decomposition between explicit roles.
    #[instrument(skip(self, roles))]
    pub fn max_flow_between(&self, roles: &FlowRoles) -> FlowResult {
        let projection = {
            let state = self.state.read();
            ProjectionBuilder::new(&state.graph)
                .blocked(&state.blocked)
                .build()
        };
        PathExtractor::run(&projection, roles.to_flow_config())
    }

    pub fn min_cut(&self, roles: &FlowRoles) -> MinCutResult {
        let projection = {
            let state = self.state.read();
            ProjectionBuilder::new(&state.graph)
                .blocked(&state.blocked)
                .build()
        };
        MinCut::run(&projection, roles.to_flow_config())
    }

    /// Default roles for the current graph.
    pub fn roles_by_kind(&self) -> FlowRoles {
        FlowRoles::by_kind(&self.state.read().graph)
    }
}

impl Default for NetworkService {
    fn default() -> Self {
        Self::new(RouteflowConfig::default())
    }
}
