// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Flow Algorithm Engine
//!
//! Algorithms never touch the network graph directly. A caller builds a
//! [`FlowProjection`] (a dense CSR copy of the active routes) and every
//! algorithm run derives its own [`ResidualNetwork`](residual::ResidualNetwork)
//! from it, so no residual state is shared between runs.
//!
//! # Example
//!
//! ```ignore
//! use routeflow_algo::{Algorithm, FlowConfig, FlowSolver, PathExtractor, ProjectionBuilder};
//!
//! let projection = ProjectionBuilder::new(&graph).blocked(&blocked).build();
//! let config = FlowConfig::new(depots, zones);
//!
//! let max_flow = FlowSolver::run(&projection, config.clone()).max_flow;
//! let paths = PathExtractor::run(&projection, config).paths;
//! ```

mod id_map;
pub mod projection;
pub mod residual;

pub mod algorithms;

pub use id_map::IdMap;
pub use projection::{FlowProjection, ProjectionBuilder};

#[cfg(test)]
pub mod test_utils;
