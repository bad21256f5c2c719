// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use crate::api::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How the report generator obtains the max-flow value and its paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStrategy {
    /// Max-flow solve and path extraction each run on their own freshly
    /// built residual network.
    #[default]
    Independent,
    /// One solve; the max-flow value is the sum of the extracted path flows.
    Combined,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Capacity strictly above this marks a route as a bottleneck (default: 10)
    pub bottleneck_threshold: u64,

    /// Capacity strictly below this marks a route as idle capacity (default: 7)
    pub idle_threshold: u64,

    pub flow_strategy: FlowStrategy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bottleneck_threshold: 10,
            idle_threshold: 7,
            flow_strategy: FlowStrategy::Independent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandConfig {
    /// Capacity added to every route into a vertex on increase-demand (default: 5)
    pub step: u64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self { step: 5 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbationConfig {
    /// Interval between perturbation cycles (default: 5s)
    #[serde(with = "duration_ms")]
    pub interval: Duration,

    /// Seed for the route picker. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Stop after this many cycles (default: unbounded)
    pub max_cycles: Option<u64>,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            seed: None,
            max_cycles: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteflowConfig {
    pub report: ReportConfig,
    pub demand: DemandConfig,
    pub perturbation: PerturbationConfig,
}

impl RouteflowConfig {
    /// Loads a JSON config file. Missing sections and fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(d.as_millis()).map_err(serde::ser::Error::custom)?;
        s.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
