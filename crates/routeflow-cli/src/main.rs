// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use routeflow::{
    BulkImport, FlowRoles, NetworkService, PerturbationConfig, Perturbator, RouteKey,
    RouteflowConfig, VertexId,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

mod render;

#[derive(Parser)]
#[command(name = "routeflow")]
#[command(about = "Distribution network max-flow and bottleneck reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct NetworkArgs {
    /// Network CSV (id,kind,name,origin,destination,capacity)
    network: PathBuf,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Block a route key before computing (repeatable), e.g. --block 2-3
    #[arg(long = "block", value_name = "ORIGIN-DESTINATION")]
    blocked: Vec<RouteKey>,
}

#[derive(Args)]
struct RoleArgs {
    /// Source vertex id (repeatable). Defaults to every depot.
    #[arg(long = "source")]
    sources: Vec<VertexId>,
    /// Sink vertex id (repeatable). Defaults to every delivery zone.
    #[arg(long = "sink")]
    sinks: Vec<VertexId>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a bottleneck / idle-capacity report
    Report {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        roles: RoleArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute max flow, flow paths and the minimum cut
    MaxFlow {
        #[command(flatten)]
        network: NetworkArgs,
        #[command(flatten)]
        roles: RoleArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the structural integrity scan
    Check {
        #[command(flatten)]
        network: NetworkArgs,
    },
    /// Block random routes on an interval and print a report each cycle
    Watch {
        #[command(flatten)]
        network: NetworkArgs,
        /// Interval in milliseconds (overrides the configuration)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Seed for the route picker (overrides the configuration)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many cycles; otherwise runs until Ctrl-C
        #[arg(long)]
        cycles: Option<u64>,
    },
}

impl RoleArgs {
    /// Explicit roles if any were given, with the missing side filled from
    /// vertex kinds.
    fn resolve(&self, service: &NetworkService) -> Option<FlowRoles> {
        if self.sources.is_empty() && self.sinks.is_empty() {
            return None;
        }
        let defaults = service.roles_by_kind();
        Some(FlowRoles {
            sources: if self.sources.is_empty() {
                defaults.sources
            } else {
                self.sources.clone()
            },
            sinks: if self.sinks.is_empty() {
                defaults.sinks
            } else {
                self.sinks.clone()
            },
        })
    }
}

fn load(args: &NetworkArgs) -> Result<NetworkService> {
    let config = match &args.config {
        Some(path) => RouteflowConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RouteflowConfig::default(),
    };

    let import = BulkImport::from_path(&args.network)
        .with_context(|| format!("Failed to import {}", args.network.display()))?;
    if import.skipped > 0 {
        eprintln!(
            "{} skipped {} malformed record(s)",
            "Warning:".yellow(),
            import.skipped
        );
    }
    debug!(
        vertices = import.vertices.len(),
        routes = import.routes.len(),
        "Network loaded"
    );

    let service = NetworkService::from_graph(import.into_graph(), config);
    for key in &args.blocked {
        service.set_blocked(*key, true);
    }
    Ok(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            network,
            roles,
            json,
        } => {
            let service = load(&network)?;
            let report = service.generate_report(roles.resolve(&service));
            if json {
                println!("{}", report.to_json_pretty()?);
            } else {
                render::print_report(&service, &report);
            }
        }
        Commands::MaxFlow {
            network,
            roles,
            json,
        } => {
            let service = load(&network)?;
            let roles = roles
                .resolve(&service)
                .unwrap_or_else(|| service.roles_by_kind());
            let flow = service.max_flow_between(&roles);
            let cut = service.min_cut(&roles);
            if json {
                let value = serde_json::json!({
                    "roles": roles,
                    "flow": flow,
                    "min_cut": cut,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                render::print_flow(&service, &roles, &flow, &cut);
            }
        }
        Commands::Check { network } => {
            let service = load(&network)?;
            let warnings = service.check_integrity();
            if warnings.is_empty() {
                println!("{} no structural issues found", "OK:".green());
            } else {
                for warning in &warnings {
                    println!("{} {}", "Warning:".yellow(), warning);
                }
            }
        }
        Commands::Watch {
            network,
            interval_ms,
            seed,
            cycles,
        } => {
            let service = Arc::new(load(&network)?);
            let mut config: PerturbationConfig = service.config().perturbation.clone();
            if let Some(ms) = interval_ms {
                config.interval = Duration::from_millis(ms);
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if cycles.is_some() {
                config.max_cycles = cycles;
            }

            println!(
                "{} every {} ms (Ctrl-C to stop)",
                "Perturbing".bold(),
                config.interval.as_millis()
            );

            let printer = Arc::clone(&service);
            let handle = Perturbator::new(Arc::clone(&service), config.clone()).spawn(move |cycle| {
                render::print_cycle(&printer, &cycle);
            });

            let total = if config.max_cycles.is_some() {
                handle.join().await?
            } else {
                tokio::signal::ctrl_c().await?;
                handle.shutdown().await?
            };
            println!("{} after {} cycle(s)", "Stopped".green(), total);
        }
    }

    Ok(())
}
