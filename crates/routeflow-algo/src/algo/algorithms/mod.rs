// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Core algorithm trait and the flow algorithms built on it.

use crate::algo::FlowProjection;

/// Core trait for all flow algorithms.
pub trait Algorithm: Send + Sync {
    /// Algorithm parameters.
    type Config: Default + Clone + Send + 'static;
    /// Result type.
    type Result: Send + 'static;

    /// Algorithm identifier.
    fn name() -> &'static str;

    /// Execute algorithm on a projection.
    fn run(projection: &FlowProjection, config: Self::Config) -> Self::Result;
}

mod max_flow;
pub use max_flow::{FlowConfig, FlowSolver, FlowSolverResult};

mod flow_paths;
pub use flow_paths::{FlowPath, FlowResult, PathExtractor};

mod min_cut;
pub use min_cut::{CutArc, MinCut, MinCutResult};
