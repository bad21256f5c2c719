// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use crate::algo::algorithms::FlowConfig;
use crate::algo::{FlowProjection, ProjectionBuilder};
use routeflow_common::core::id::VertexId;
use routeflow_common::core::model::{Route, Vertex};
use routeflow_common::graph::network_graph::NetworkGraph;

pub fn build_test_projection(vertices: &[u64], routes: &[(u64, u64, u64)]) -> FlowProjection {
    let mut graph = NetworkGraph::with_capacity(vertices.len());
    for &id in vertices {
        graph.add_vertex(Vertex::hub(id, format!("V{}", id)));
    }
    for &(origin, destination, capacity) in routes {
        assert!(
            graph.contains_vertex(VertexId(origin)) && graph.contains_vertex(VertexId(destination)),
            "Route endpoint not in vertex list"
        );
        graph.add_route(Route::new(origin, destination, capacity));
    }

    ProjectionBuilder::new(&graph).build()
}

pub fn flow_config(sources: &[u64], sinks: &[u64]) -> FlowConfig {
    FlowConfig::new(
        sources.iter().copied().map(VertexId),
        sinks.iter().copied().map(VertexId),
    )
}
