// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Multi-source, multi-sink maximum flow (Edmonds-Karp).
//!
//! Sources and sinks are joined through a virtual super-source and super-sink,
//! then shortest augmenting paths are pushed until none remain. The result
//! owns the drained residual network, which is only good for inspection
//! (e.g. min-cut). Path extraction builds its own fresh residual network.

use crate::algo::algorithms::Algorithm;
use crate::algo::residual::{ResidualNetwork, Terminals};
use crate::algo::FlowProjection;
use routeflow_common::core::id::VertexId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub struct FlowSolver;

/// Source and sink roles for a flow computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    pub sources: Vec<VertexId>,
    pub sinks: Vec<VertexId>,
}

impl FlowConfig {
    pub fn new(sources: impl IntoIterator<Item = VertexId>, sinks: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            sinks: sinks.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowSolverResult {
    pub max_flow: u64,
    /// Residual network after the last augmentation.
    pub residual: ResidualNetwork,
}

impl Algorithm for FlowSolver {
    type Config = FlowConfig;
    type Result = FlowSolverResult;

    fn name() -> &'static str {
        "max_flow"
    }

    #[instrument(skip_all, fields(sources = config.sources.len(), sinks = config.sinks.len()))]
    fn run(projection: &FlowProjection, config: Self::Config) -> Self::Result {
        let terminals = Terminals::resolve(projection, &config.sources, &config.sinks);
        let mut residual = ResidualNetwork::new(projection, &terminals);

        if terminals.is_empty() {
            debug!("No usable sources or sinks; max flow is 0");
            return FlowSolverResult {
                max_flow: 0,
                residual,
            };
        }

        let max_flow = residual.saturate();
        debug!(max_flow, augmentations = residual.augmentations(), "Max flow computed");

        FlowSolverResult { max_flow, residual }
    }
}
