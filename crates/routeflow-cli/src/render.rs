// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use colored::*;
use prettytable::{Cell, Row, Table};
use routeflow::{
    FlowPath, FlowResult, FlowRoles, MinCutResult, NetworkService, PerturbationCycle, Report,
    RouteSummary, VertexId,
};

fn vertex_name(service: &NetworkService, id: VertexId) -> String {
    service.read(|state| {
        state
            .graph
            .vertex(id)
            .map_or_else(|| id.to_string(), |v| v.name.clone())
    })
}

fn describe_path(service: &NetworkService, path: &FlowPath) -> String {
    path.vertices()
        .into_iter()
        .map(|id| vertex_name(service, id))
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn route_table(title: &str, routes: &[RouteSummary]) {
    println!("{} ({})", title.bold(), routes.len());
    if routes.is_empty() {
        println!("  none");
        return;
    }
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID").style_spec("bf"),
        Cell::new("From").style_spec("bf"),
        Cell::new("To").style_spec("bf"),
        Cell::new("Capacity").style_spec("bf"),
        Cell::new("Usage").style_spec("bf"),
    ]));
    for summary in routes {
        let route = &summary.route;
        table.add_row(Row::new(vec![
            Cell::new(&route.id.map_or_else(|| "-".to_string(), |id| id.to_string())),
            Cell::new(&summary.origin_name),
            Cell::new(&summary.destination_name),
            Cell::new(&route.capacity.to_string()),
            Cell::new(&route.usage.to_string()),
        ]));
    }
    table.printstd();
}

fn path_table(service: &NetworkService, paths: &[FlowPath]) {
    if paths.is_empty() {
        println!("  no augmenting paths");
        return;
    }
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Path").style_spec("bf"),
        Cell::new("Flow").style_spec("bf"),
    ]));
    for path in paths {
        table.add_row(Row::new(vec![
            Cell::new(&describe_path(service, path)),
            Cell::new(&path.flow.to_string()),
        ]));
    }
    table.printstd();
}

pub fn print_report(service: &NetworkService, report: &Report) {
    println!(
        "{} {}",
        "Report".bold(),
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{} {}", "Max flow:".green(), report.max_flow);
    path_table(service, &report.flow_paths);
    route_table("Bottlenecks", &report.bottlenecks);
    route_table("Idle capacity", &report.idle_capacity);
}

pub fn print_flow(
    service: &NetworkService,
    roles: &FlowRoles,
    flow: &FlowResult,
    cut: &MinCutResult,
) {
    let names = |ids: &[VertexId]| {
        ids.iter()
            .map(|id| vertex_name(service, *id))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("{} {}", "Sources:".bold(), names(&roles.sources));
    println!("{} {}", "Sinks:".bold(), names(&roles.sinks));
    println!("{} {}", "Max flow:".green(), flow.max_flow);
    path_table(service, &flow.paths);

    println!("{} capacity {}", "Minimum cut".bold(), cut.cut_capacity);
    if cut.cut_arcs.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("From").style_spec("bf"),
        Cell::new("To").style_spec("bf"),
        Cell::new("Capacity").style_spec("bf"),
    ]));
    for arc in &cut.cut_arcs {
        table.add_row(Row::new(vec![
            Cell::new(&vertex_name(service, arc.origin)),
            Cell::new(&vertex_name(service, arc.destination)),
            Cell::new(&arc.capacity.to_string()),
        ]));
    }
    table.printstd();
}

pub fn print_cycle(service: &NetworkService, cycle: &PerturbationCycle) {
    let action = match &cycle.toggled {
        Some(toggle) if toggle.blocked => format!("blocked {}", toggle.canonical_key()).red(),
        Some(toggle) => format!("unblocked {}", toggle.canonical_key()).green(),
        None => "no route to toggle".yellow(),
    };
    println!(
        "[{}] {} max flow {} ({} bottlenecks, {} idle)",
        cycle.cycle,
        action,
        cycle.report.max_flow,
        cycle.report.bottlenecks.len(),
        cycle.report.idle_capacity.len()
    );
    for path in &cycle.report.flow_paths {
        println!("    {} [{}]", describe_path(service, path), path.flow);
    }
}
