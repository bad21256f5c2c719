// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! Scheduled random perturbation.
//!
//! Every interval one randomly chosen route has its block state toggled and a
//! fresh report is generated. A cycle runs to completion inside the task
//! before the next tick is awaited, so cycles never overlap. Ticks missed
//! while a cycle was running are skipped rather than replayed.

use crate::api::edge_state::BlockToggle;
use crate::api::report::{FlowRoles, Report};
use crate::api::service::NetworkService;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use routeflow_common::config::PerturbationConfig;
use routeflow_common::{Result, RouteflowError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Outcome of one perturbation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct PerturbationCycle {
    /// 1-based
    pub cycle: u64,
    /// `None` when the network had no route to toggle.
    pub toggled: Option<BlockToggle>,
    pub report: Report,
}

pub struct Perturbator<R = StdRng> {
    service: Arc<NetworkService>,
    config: PerturbationConfig,
    roles: Option<FlowRoles>,
    rng: R,
    cycles: u64,
}

impl Perturbator<StdRng> {
    /// Seeds from `config.seed`, or from OS entropy when unset.
    pub fn new(service: Arc<NetworkService>, config: PerturbationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(service, config, rng)
    }
}

impl<R: Rng + Send + 'static> Perturbator<R> {
    pub fn with_rng(service: Arc<NetworkService>, config: PerturbationConfig, rng: R) -> Self {
        Self {
            service,
            config,
            roles: None,
            rng,
            cycles: 0,
        }
    }

    /// Overrides the kind-based source/sink roles used for reports.
    pub fn roles(mut self, roles: FlowRoles) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Toggles one random route and regenerates the report.
    pub fn run_cycle(&mut self) -> PerturbationCycle {
        self.cycles += 1;
        let toggled = self.service.toggle_random_route(&mut self.rng);
        if toggled.is_none() {
            warn!(cycle = self.cycles, "No route available to perturb");
        }
        let report = self.service.generate_report(self.roles.clone());

        debug!(
            cycle = self.cycles,
            key = ?toggled.map(|t| t.canonical_key()),
            max_flow = report.max_flow,
            "Perturbation cycle completed"
        );

        PerturbationCycle {
            cycle: self.cycles,
            toggled,
            report,
        }
    }

    fn limit_reached(&self) -> bool {
        self.config.max_cycles.is_some_and(|max| self.cycles >= max)
    }

    /// Runs cycles on the tokio runtime until stopped or `max_cycles` is
    /// reached. The first cycle fires one interval after spawning.
    ///
    /// Dropping the returned handle also stops the task.
    pub fn spawn<F>(mut self, mut on_cycle: F) -> PerturbationHandle
    where
        F: FnMut(PerturbationCycle) + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        // tokio panics on a zero period
        let period = self.config.interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;

            info!(
                interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
                "Perturbation started"
            );

            while !self.limit_reached() {
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                    _ = interval.tick() => {}
                }
                // A stop that lands while the tick resolves still wins
                if *stop_rx.borrow() {
                    break;
                }
                on_cycle(self.run_cycle());
            }

            info!(cycles = self.cycles, "Perturbation stopped");
            self.cycles
        });

        PerturbationHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Cancellation handle for a spawned [`Perturbator`].
pub struct PerturbationHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl PerturbationHandle {
    /// Requests a stop. A cycle already running finishes first.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the task to end. Returns the number of cycles run.
    pub async fn join(self) -> Result<u64> {
        let PerturbationHandle { stop, task } = self;
        let cycles = task
            .await
            .map_err(|e| RouteflowError::Internal(anyhow::anyhow!("Perturbation task failed: {}", e)))?;
        drop(stop);
        Ok(cycles)
    }

    /// `stop` followed by `join`.
    pub async fn shutdown(self) -> Result<u64> {
        self.stop();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routeflow_common::config::RouteflowConfig;
    use routeflow_common::core::id::VertexId;

    fn service() -> Arc<NetworkService> {
        let service = NetworkService::new(RouteflowConfig::default());
        service.add_route(VertexId(0), VertexId(1), 10, 0).unwrap();
        service.add_route(VertexId(1), VertexId(2), 7, 0).unwrap();
        Arc::new(service)
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let config = PerturbationConfig {
            seed: Some(11),
            ..PerturbationConfig::default()
        };

        let keys = |service: Arc<NetworkService>| {
            let mut perturbator = Perturbator::new(service, config.clone());
            (0..6)
                .map(|_| perturbator.run_cycle().toggled.map(|t| t.key))
                .collect::<Vec<_>>()
        };

        assert_eq!(keys(service()), keys(service()));
    }

    #[test]
    fn test_cycle_toggles_and_reports() {
        let service = service();
        let mut perturbator =
            Perturbator::with_rng(service.clone(), PerturbationConfig::default(), StdRng::seed_from_u64(3));

        let cycle = perturbator.run_cycle();
        let toggled = cycle.toggled.unwrap();
        assert!(toggled.blocked);
        assert_eq!(cycle.cycle, 1);
        // Either route blocked cuts the only chain
        assert_eq!(cycle.report.max_flow, 0);
        assert_eq!(service.current_state().blocked, vec![toggled.canonical_key()]);
    }

    #[test]
    fn test_cycle_without_routes() {
        let service = Arc::new(NetworkService::default());
        let mut perturbator = Perturbator::new(service, PerturbationConfig::default());
        let cycle = perturbator.run_cycle();
        assert!(cycle.toggled.is_none());
        assert_eq!(cycle.report.max_flow, 0);
    }
}
