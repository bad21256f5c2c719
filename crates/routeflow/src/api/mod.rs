// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

pub mod edge_state;
pub mod import;
pub mod perturbation;
pub mod report;
pub mod service;

pub use edge_state::{BlockToggle, EdgeStateManager};
pub use import::BulkImport;
pub use perturbation::{PerturbationCycle, PerturbationHandle, Perturbator};
pub use report::{FlowRoles, Report, ReportGenerator, ReportInput, RouteSummary};
pub use service::{NetworkService, NetworkSnapshot, NetworkState};
