// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

pub mod algo;

pub use algo::algorithms::{
    Algorithm, CutArc, FlowConfig, FlowPath, FlowResult, FlowSolver, FlowSolverResult, MinCut,
    MinCutResult, PathExtractor,
};
pub use algo::projection::{FlowProjection, ProjectionBuilder};
pub use algo::residual::{ResidualNetwork, Terminals};
