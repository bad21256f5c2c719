// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

pub mod api {
    pub mod error;
}

pub mod config;

pub mod core {
    pub mod blocked;
    pub mod id;
    pub mod model;
}

pub mod graph {
    pub mod network_graph;
}

// Re-exports for convenience
pub use api::error::{Result, RouteflowError};
pub use config::{DemandConfig, FlowStrategy, PerturbationConfig, ReportConfig, RouteflowConfig};
pub use core::blocked::BlockedSet;
pub use core::id::{RouteId, RouteKey, VertexId};
pub use core::model::{Priority, Route, RouteEdit, Vertex, VertexKind};
pub use graph::network_graph::{NetworkGraph, StructuralWarning};
