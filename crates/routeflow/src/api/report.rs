// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Bottleneck / idle-capacity report.
//!
//! A report is computed in two phases. [`ReportGenerator::snapshot`] copies
//! what it needs out of the graph (flow projection, active routes with their
//! endpoint names, source/sink roles) and is meant to run under the network
//! read lock. [`ReportGenerator::compute`] then runs the flow algorithms on
//! that copy without holding any lock.

use chrono::{DateTime, Utc};
use routeflow_algo::{
    Algorithm, FlowConfig, FlowPath, FlowProjection, FlowSolver, PathExtractor, ProjectionBuilder,
};
use routeflow_common::config::{FlowStrategy, ReportConfig};
use routeflow_common::core::blocked::BlockedSet;
use routeflow_common::core::id::VertexId;
use routeflow_common::core::model::{Route, VertexKind};
use routeflow_common::graph::network_graph::NetworkGraph;
use routeflow_common::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Source and sink assignment for a flow computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRoles {
    pub sources: Vec<VertexId>,
    pub sinks: Vec<VertexId>,
}

impl FlowRoles {
    pub fn new(
        sources: impl IntoIterator<Item = VertexId>,
        sinks: impl IntoIterator<Item = VertexId>,
    ) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            sinks: sinks.into_iter().collect(),
        }
    }

    /// Depots are sources, delivery zones are sinks.
    pub fn by_kind(graph: &NetworkGraph) -> Self {
        let mut roles = Self::default();
        for vertex in graph.sorted_vertices() {
            match vertex.kind {
                VertexKind::Depot => roles.sources.push(vertex.id),
                VertexKind::DeliveryZone => roles.sinks.push(vertex.id),
                VertexKind::Hub | VertexKind::Generic => {}
            }
        }
        roles
    }

    pub fn to_flow_config(&self) -> FlowConfig {
        FlowConfig::new(self.sources.iter().copied(), self.sinks.iter().copied())
    }
}

/// A route together with its endpoint names. Unknown endpoints are named by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    #[serde(flatten)]
    pub route: Route,
    pub origin_name: String,
    pub destination_name: String,
}

impl RouteSummary {
    pub fn from_graph(graph: &NetworkGraph, route: &Route) -> Self {
        let name = |id: VertexId| {
            graph
                .vertex(id)
                .map_or_else(|| id.to_string(), |v| v.name.clone())
        };
        Self {
            route: route.clone(),
            origin_name: name(route.origin),
            destination_name: name(route.destination),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    /// Active routes with capacity above the bottleneck threshold.
    pub bottlenecks: Vec<RouteSummary>,
    /// Active routes with capacity below the idle threshold.
    pub idle_capacity: Vec<RouteSummary>,
    pub max_flow: u64,
    pub flow_paths: Vec<FlowPath>,
}

impl Report {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Everything a report needs, detached from the live graph.
#[derive(Debug, Clone)]
pub struct ReportInput {
    projection: FlowProjection,
    active_routes: Vec<RouteSummary>,
    roles: FlowRoles,
}

impl ReportInput {
    pub fn projection(&self) -> &FlowProjection {
        &self.projection
    }

    pub fn roles(&self) -> &FlowRoles {
        &self.roles
    }

    pub fn active_routes(&self) -> &[RouteSummary] {
        &self.active_routes
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Copies the report inputs out of `graph`. `roles` defaults to
    /// [`FlowRoles::by_kind`].
    pub fn snapshot(
        &self,
        graph: &NetworkGraph,
        blocked: &BlockedSet,
        roles: Option<FlowRoles>,
    ) -> ReportInput {
        let active_routes = graph
            .routes()
            .into_iter()
            .filter(|route| blocked.is_active(route))
            .map(|route| RouteSummary::from_graph(graph, route))
            .collect();

        ReportInput {
            projection: ProjectionBuilder::new(graph).blocked(blocked).build(),
            active_routes,
            roles: roles.unwrap_or_else(|| FlowRoles::by_kind(graph)),
        }
    }

    #[instrument(skip_all, fields(routes = input.active_routes.len()))]
    pub fn compute(&self, input: ReportInput) -> Report {
        let ReportInput {
            projection,
            active_routes,
            roles,
        } = input;

        let (bottlenecks, idle_capacity) = self.classify(active_routes);

        let config = roles.to_flow_config();
        let extracted = PathExtractor::run(&projection, config.clone());
        let max_flow = match self.config.flow_strategy {
            FlowStrategy::Independent => FlowSolver::run(&projection, config).max_flow,
            FlowStrategy::Combined => extracted.path_flow_total(),
        };
        if max_flow != extracted.path_flow_total() {
            debug!(
                max_flow,
                path_total = extracted.path_flow_total(),
                "Path flows do not sum to the max flow"
            );
        }

        info!(
            max_flow,
            bottlenecks = bottlenecks.len(),
            idle = idle_capacity.len(),
            paths = extracted.paths.len(),
            "Report generated"
        );

        Report {
            timestamp: Utc::now(),
            bottlenecks,
            idle_capacity,
            max_flow,
            flow_paths: extracted.paths,
        }
    }

    /// Snapshot and compute in one step.
    pub fn generate(
        &self,
        graph: &NetworkGraph,
        blocked: &BlockedSet,
        roles: Option<FlowRoles>,
    ) -> Report {
        self.compute(self.snapshot(graph, blocked, roles))
    }

    /// Splits routes into (bottlenecks, idle capacity). The two tests are
    /// independent, so overlapping thresholds can put a route in both lists.
    fn classify(&self, routes: Vec<RouteSummary>) -> (Vec<RouteSummary>, Vec<RouteSummary>) {
        let mut bottlenecks = Vec::new();
        let mut idle = Vec::new();
        for summary in routes {
            let capacity = summary.route.capacity;
            if capacity < self.config.idle_threshold {
                idle.push(summary.clone());
            }
            if capacity > self.config.bottleneck_threshold {
                bottlenecks.push(summary);
            }
        }
        (bottlenecks, idle)
    }
}
