// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use proptest::prelude::*;
use routeflow_algo::{Algorithm, FlowConfig, FlowSolver, MinCut, PathExtractor, ProjectionBuilder};
use routeflow_common::{BlockedSet, NetworkGraph, Route, RouteKey, Vertex, VertexId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct Case {
    vertex_count: u64,
    routes: Vec<(u64, u64, u64)>,
    sources: Vec<u64>,
    sinks: Vec<u64>,
    blocked: Vec<usize>,
}

impl Case {
    fn graph(&self) -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        for id in 0..self.vertex_count {
            graph.add_vertex(Vertex::hub(id, format!("V{}", id)));
        }
        for &(u, v, cap) in &self.routes {
            graph.add_route(Route::new(u, v, cap));
        }
        graph
    }

    fn blocked_set(&self) -> BlockedSet {
        self.blocked
            .iter()
            .filter_map(|&i| self.routes.get(i))
            .map(|&(u, v, _)| RouteKey::new(VertexId(u), VertexId(v)))
            .collect()
    }

    fn config(&self) -> FlowConfig {
        FlowConfig::new(
            self.sources.iter().copied().map(VertexId),
            self.sinks.iter().copied().map(VertexId),
        )
    }

    /// Active capacity per ordered pair, parallel routes summed.
    fn active_capacity(&self, blocked: &BlockedSet) -> HashMap<(u64, u64), u64> {
        let mut caps = HashMap::new();
        for &(u, v, cap) in &self.routes {
            if u != v && !blocked.is_blocked(VertexId(u), VertexId(v)) {
                *caps.entry((u, v)).or_insert(0) += cap;
            }
        }
        caps
    }

    /// Minimum cut by enumerating every vertex subset.
    fn brute_force_min_cut(&self, blocked: &BlockedSet) -> u64 {
        let sources: HashSet<u64> = self.sources.iter().copied().collect();
        let sinks: HashSet<u64> = self
            .sinks
            .iter()
            .copied()
            .filter(|t| !sources.contains(t))
            .collect();
        if sources.is_empty() || sinks.is_empty() {
            return 0;
        }

        let caps = self.active_capacity(blocked);
        let mut best = u64::MAX;
        for mask in 0u32..(1 << self.vertex_count) {
            let inside = |v: u64| mask & (1 << v) != 0;
            if !sources.iter().all(|&s| inside(s)) || sinks.iter().any(|&t| inside(t)) {
                continue;
            }
            let cut: u64 = caps
                .iter()
                .filter(|&(&(u, v), _)| inside(u) && !inside(v))
                .map(|(_, &cap)| cap)
                .sum();
            best = best.min(cut);
        }
        best
    }
}

fn case_strategy() -> impl Strategy<Value = Case> {
    (2u64..=7).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, 0u64..=20), 0..24),
            prop::collection::vec(0..n, 0..3),
            prop::collection::vec(0..n, 0..3),
            prop::collection::vec(0usize..24, 0..4),
        )
            .prop_map(|(vertex_count, routes, sources, sinks, blocked)| Case {
                vertex_count,
                routes,
                sources,
                sinks,
                blocked,
            })
    })
}

proptest! {
    #[test]
    fn max_flow_is_bounded_by_source_capacity(case in case_strategy()) {
        let graph = case.graph();
        let blocked = case.blocked_set();
        let projection = ProjectionBuilder::new(&graph).blocked(&blocked).build();
        let result = FlowSolver::run(&projection, case.config());

        let outgoing: u64 = case
            .active_capacity(&blocked)
            .iter()
            .filter(|&(&(u, _), _)| case.sources.contains(&u))
            .map(|(_, &cap)| cap)
            .sum();
        prop_assert!(result.max_flow <= outgoing);
    }

    #[test]
    fn max_flow_equals_min_cut(case in case_strategy()) {
        let graph = case.graph();
        let blocked = case.blocked_set();
        let projection = ProjectionBuilder::new(&graph).blocked(&blocked).build();

        let expected = case.brute_force_min_cut(&blocked);
        let solved = FlowSolver::run(&projection, case.config());
        let cut = MinCut::run(&projection, case.config());

        prop_assert_eq!(solved.max_flow, expected);
        prop_assert_eq!(cut.max_flow, expected);
        prop_assert_eq!(cut.cut_capacity, expected);
    }

    #[test]
    fn decomposition_sums_to_max_flow(case in case_strategy()) {
        let graph = case.graph();
        let blocked = case.blocked_set();
        let projection = ProjectionBuilder::new(&graph).blocked(&blocked).build();

        let solved = FlowSolver::run(&projection, case.config());
        let extracted = PathExtractor::run(&projection, case.config());

        prop_assert_eq!(extracted.max_flow, solved.max_flow);
        prop_assert_eq!(extracted.path_flow_total(), solved.max_flow);
    }

    #[test]
    fn paths_follow_active_routes(case in case_strategy()) {
        let graph = case.graph();
        let blocked = case.blocked_set();
        let projection = ProjectionBuilder::new(&graph).blocked(&blocked).build();
        let extracted = PathExtractor::run(&projection, case.config());
        let caps = case.active_capacity(&blocked);

        let sources: HashSet<VertexId> = case.sources.iter().copied().map(VertexId).collect();
        let sinks: HashSet<VertexId> = case.sinks.iter().copied().map(VertexId).collect();
        let mut carried: HashMap<(u64, u64), u64> = HashMap::new();

        for path in &extracted.paths {
            prop_assert!(path.flow > 0);
            prop_assert!(!path.hops.is_empty());
            prop_assert!(sources.contains(&path.source().unwrap()));
            prop_assert!(sinks.contains(&path.sink().unwrap()));

            for pair in path.hops.windows(2) {
                prop_assert_eq!(pair[0].1, pair[1].0);
            }
            let vertices = path.vertices();
            let distinct: HashSet<_> = vertices.iter().collect();
            prop_assert_eq!(distinct.len(), vertices.len());

            for &(u, v) in &path.hops {
                prop_assert!(caps.get(&(u.0, v.0)).is_some_and(|&c| c > 0));
                *carried.entry((u.0, v.0)).or_insert(0) += path.flow;
            }
        }
        for (pair, flow) in carried {
            prop_assert!(flow <= caps[&pair]);
        }
    }

    #[test]
    fn blocking_never_increases_flow(case in case_strategy(), extra in 0usize..24) {
        let graph = case.graph();
        let blocked = case.blocked_set();
        let before = FlowSolver::run(
            &ProjectionBuilder::new(&graph).blocked(&blocked).build(),
            case.config(),
        )
        .max_flow;

        let mut more = blocked.clone();
        if let Some(&(u, v, _)) = case.routes.get(extra) {
            more.block(RouteKey::new(VertexId(u), VertexId(v)));
        }
        let after = FlowSolver::run(
            &ProjectionBuilder::new(&graph).blocked(&more).build(),
            case.config(),
        )
        .max_flow;

        prop_assert!(after <= before);

        let unblocked = FlowSolver::run(&ProjectionBuilder::new(&graph).build(), case.config()).max_flow;
        prop_assert!(unblocked >= before);
    }

    #[test]
    fn solving_is_deterministic(case in case_strategy()) {
        let graph = case.graph();
        let blocked = case.blocked_set();

        let first = PathExtractor::run(
            &ProjectionBuilder::new(&graph).blocked(&blocked).build(),
            case.config(),
        );
        let second = PathExtractor::run(
            &ProjectionBuilder::new(&graph).blocked(&blocked).build(),
            case.config(),
        );
        prop_assert_eq!(first, second);
    }
}

fn scenario_graph() -> NetworkGraph {
    let mut graph = NetworkGraph::new();
    graph.add_vertex(Vertex::depot(1, "D1"));
    graph.add_vertex(Vertex::hub(2, "H1"));
    graph.add_vertex(Vertex::delivery_zone(3, "Z1"));
    graph.add_route(Route::new(1, 2, 10));
    graph.add_route(Route::new(2, 3, 7));
    graph
}

#[test]
fn test_chain_scenario() {
    let graph = scenario_graph();
    let projection = ProjectionBuilder::new(&graph).build();
    let result = PathExtractor::run(&projection, FlowConfig::new([VertexId(1)], [VertexId(3)]));

    assert_eq!(result.max_flow, 7);
    assert_eq!(result.paths.len(), 1);
    assert_eq!(
        result.paths[0].hops,
        vec![(VertexId(1), VertexId(2)), (VertexId(2), VertexId(3))]
    );
    assert_eq!(result.paths[0].flow, 7);
}

#[test]
fn test_blocked_chain_scenario() {
    let graph = scenario_graph();
    let blocked: BlockedSet = [RouteKey::new(VertexId(2), VertexId(3))]
        .into_iter()
        .collect();
    let projection = ProjectionBuilder::new(&graph).blocked(&blocked).build();
    let result = PathExtractor::run(&projection, FlowConfig::new([VertexId(1)], [VertexId(3)]));

    assert_eq!(result.max_flow, 0);
    assert!(result.paths.is_empty());
}

#[test]
fn test_parallel_sources_scenario() {
    let mut graph = NetworkGraph::new();
    graph.add_vertex(Vertex::depot(1, "D1"));
    graph.add_vertex(Vertex::depot(2, "D2"));
    graph.add_vertex(Vertex::hub(3, "H1"));
    graph.add_vertex(Vertex::delivery_zone(4, "Z1"));
    graph.add_route(Route::new(1, 3, 5));
    graph.add_route(Route::new(2, 3, 5));
    graph.add_route(Route::new(3, 4, 8));

    let projection = ProjectionBuilder::new(&graph).build();
    let config = FlowConfig::new([VertexId(1), VertexId(2)], [VertexId(4)]);
    let result = PathExtractor::run(&projection, config.clone());

    assert_eq!(FlowSolver::run(&projection, config).max_flow, 8);
    assert_eq!(result.path_flow_total(), 8);
}
