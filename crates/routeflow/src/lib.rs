// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! # Routeflow - Distribution Network Flow Engine
//!
//! Routeflow models a logistics network of depots, hubs and delivery zones as
//! a capacitated directed graph. It answers how much can be delivered from
//! depots to delivery zones under the current capacities and blockages, and
//! which routes are bottlenecks or carry idle capacity.

pub mod api;

pub use api::{
    BlockToggle, BulkImport, EdgeStateManager, FlowRoles, NetworkService, NetworkSnapshot,
    NetworkState, PerturbationCycle, PerturbationHandle, Perturbator, Report, ReportGenerator,
    RouteSummary,
};

// Re-exports from internal crates
pub use routeflow_algo::{
    Algorithm, CutArc, FlowConfig, FlowPath, FlowProjection, FlowResult, FlowSolver, MinCut,
    MinCutResult, PathExtractor, ProjectionBuilder,
};
pub use routeflow_common::{
    BlockedSet, DemandConfig, FlowStrategy, NetworkGraph, PerturbationConfig, Priority,
    ReportConfig, Result, Route, RouteEdit, RouteId, RouteKey, RouteflowConfig, RouteflowError,
    StructuralWarning, Vertex, VertexId, VertexKind,
};

// Re-export crates
pub use routeflow_algo as algo;
pub use routeflow_common as common;
