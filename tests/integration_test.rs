/// End-to-end tests
///
/// Drives every algorithm through the controller the way a front-end
/// would, and cross-checks traversal results against petgraph and
/// pathfinding.

use graph_stepper::algorithms::{
    AlgorithmKind, Selection, StoppingCondition, TraversalDiscipline, TraversalOutcome,
    TraversalReport,
};
use graph_stepper::config::PlaybackConfig;
use graph_stepper::engine::{
    AlgorithmStatus, Controller, DataKind, EngineError, Granularity, RecordingSink, VisualStyle,
};
use graph_stepper::storage::{GraphSource, MemoryGraph};
use graph_stepper::types::{EdgeId, VertexId};
use petgraph::graph::{NodeIndex, UnGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn cycle4() -> Arc<MemoryGraph> {
    Arc::new(
        MemoryGraph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)]).unwrap(),
    )
}

/// Random sparse graph, usually with several components
fn random_graph(seed: u64, n: u32, m: usize) -> MemoryGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let edges: Vec<(u32, u32, f64)> = (0..m)
        .map(|_| {
            let a = rng.gen_range(0..n);
            let b = rng.gen_range(0..n);
            (a, b, f64::from(rng.gen_range(1u32..20)))
        })
        .collect();
    MemoryGraph::from_edges(n, &edges).unwrap()
}

fn to_petgraph(graph: &MemoryGraph) -> UnGraph<(), f64> {
    let mut g = UnGraph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..graph.vertex_count()).map(|_| g.add_node(())).collect();
    for edge in graph.edges() {
        g.add_edge(nodes[edge.v1.index()], nodes[edge.v2.index()], edge.length);
    }
    g
}

fn neighbors(graph: &MemoryGraph, vertex: u32) -> Vec<u32> {
    let v = VertexId::new(vertex);
    graph
        .incident_edges(v)
        .unwrap()
        .iter()
        .filter_map(|&e| graph.edge(e).ok()?.other_endpoint(v))
        .map(|v| v.as_raw())
        .collect()
}

fn reachable_from(start: u32) -> Selection {
    Selection {
        start: Some(VertexId::new(start)),
        stop: StoppingCondition::FindReachable,
        ..Selection::default()
    }
}

/// Step a fresh controller to completion at one granularity
fn run_paused(
    graph: Arc<MemoryGraph>,
    kind: AlgorithmKind,
    selection: Selection,
    granularity: Granularity,
) -> (Controller, RecordingSink) {
    let sink = RecordingSink::new();
    let playback = PlaybackConfig {
        delay_ms: -1,
        granularity,
    };
    let mut controller = Controller::new(&playback, Box::new(sink.clone()));
    controller.load(graph, DataKind::Graph);
    controller.select(kind.build(Some(3)).unwrap(), selection).unwrap();

    while controller.status() != AlgorithmStatus::Complete {
        controller.step(granularity).unwrap();
    }
    (controller, sink)
}

fn traversal_report(controller: &Controller) -> TraversalReport {
    serde_json::from_value(controller.algorithm().unwrap().report()).unwrap()
}

/// Test the four-cycle shortest hop path through the controller
#[test]
fn test_bfs_path_on_cycle() {
    let selection = Selection {
        start: Some(VertexId::new(0)),
        end: Some(VertexId::new(2)),
        stop: StoppingCondition::StopAtEnd,
        discipline: TraversalDiscipline::Bfs,
    };
    let (controller, sink) =
        run_paused(cycle4(), AlgorithmKind::Traversal, selection, Granularity::Completion);

    let report = traversal_report(&controller);
    assert_eq!(report.outcome, TraversalOutcome::PathFound);
    let path = report.path.unwrap();
    assert_eq!(path.vertices, vec![VertexId::new(0), VertexId::new(1), VertexId::new(2)]);
    assert_eq!(path.value, 2.0);

    let status = sink.last_status().unwrap();
    assert!(status.starts_with("Found path"), "{}", status);
    assert_eq!(sink.edge_styles()[&EdgeId::new(1)], VisualStyle::OnPath);
    assert_eq!(controller.execution_counts()["START"], 1);
}

/// Test that the unit of stepping never changes the result
#[test]
fn test_granularity_does_not_change_result() {
    let graph = Arc::new(random_graph(11, 30, 45));
    for kind in AlgorithmKind::ALL {
        let selection = Selection {
            stop: StoppingCondition::FindAll,
            discipline: TraversalDiscipline::Rfs,
            ..reachable_from(0)
        };
        let runs: Vec<(Controller, RecordingSink)> = [
            Granularity::Action,
            Granularity::Iteration,
            Granularity::Completion,
        ]
        .into_iter()
        .map(|g| run_paused(graph.clone(), kind, selection, g))
        .collect();

        let first = &runs[0].0;
        for (other, _) in &runs[1..] {
            assert_eq!(
                first.algorithm().unwrap().report(),
                other.algorithm().unwrap().report(),
                "{}",
                kind
            );
            assert_eq!(first.actions_performed(), other.actions_performed());
            assert_eq!(first.execution_counts(), other.execution_counts());
        }
    }
}

/// Test Dijkstra distances against petgraph
#[test]
fn test_dijkstra_matches_petgraph() {
    for seed in 0..5 {
        let graph = Arc::new(random_graph(seed, 25, 50));
        let (controller, _) = run_paused(
            graph.clone(),
            AlgorithmKind::Dijkstra,
            reachable_from(0),
            Granularity::Completion,
        );
        let report = traversal_report(&controller);

        let expected = petgraph::algo::dijkstra(&to_petgraph(&graph), NodeIndex::new(0), None, |e| {
            *e.weight()
        });
        assert_eq!(report.tree.len(), expected.len());
        for entry in &report.tree {
            let distance = expected[&NodeIndex::new(entry.vertex().index())];
            assert!(
                (entry.value() - distance).abs() < 1e-9,
                "seed {}: {} has {} but petgraph says {}",
                seed,
                entry.vertex(),
                entry.value(),
                distance
            );
        }
    }
}

/// Test BFS hop counts against pathfinding
#[test]
fn test_bfs_hops_match_pathfinding() {
    let graph = Arc::new(random_graph(21, 30, 40));
    let (controller, _) = run_paused(
        graph.clone(),
        AlgorithmKind::Traversal,
        reachable_from(0),
        Granularity::Iteration,
    );
    let report = traversal_report(&controller);

    for entry in &report.tree {
        let goal = entry.vertex().as_raw();
        let path = pathfinding::prelude::bfs(&0u32, |&n| neighbors(&graph, n), |&n| n == goal)
            .unwrap();
        assert_eq!(entry.value() as usize, path.len() - 1, "hops to {}", entry.vertex());
    }
}

/// Test Prim's forest weight against petgraph's minimum spanning tree
#[test]
fn test_prim_matches_minimum_spanning_forest() {
    for seed in 0..5 {
        let graph = Arc::new(random_graph(100 + seed, 20, 35));
        let selection = Selection {
            stop: StoppingCondition::FindAll,
            ..reachable_from(0)
        };
        let (controller, _) =
            run_paused(graph.clone(), AlgorithmKind::Prim, selection, Granularity::Completion);
        let report = traversal_report(&controller);
        let weight: f64 = report.tree.iter().map(|e| e.value()).sum();

        let pg = to_petgraph(&graph);
        let expected: f64 = petgraph::algo::min_spanning_tree(&pg)
            .filter_map(|element| match element {
                petgraph::data::Element::Edge { weight, .. } => Some(weight),
                _ => None,
            })
            .sum();
        assert!((weight - expected).abs() < 1e-9, "seed {}: {} vs {}", seed, weight, expected);
        assert_eq!(report.components.len(), petgraph::algo::connected_components(&pg));
    }
}

/// Test that find-all covers every vertex exactly once
#[test]
fn test_find_all_partitions_vertices() {
    let graph = Arc::new(random_graph(5, 40, 25));
    let selection = Selection {
        stop: StoppingCondition::FindAll,
        discipline: TraversalDiscipline::Dfs,
        ..reachable_from(0)
    };
    let (controller, _) =
        run_paused(graph.clone(), AlgorithmKind::Traversal, selection, Granularity::Iteration);
    let report = traversal_report(&controller);

    let mut seen: Vec<VertexId> = report
        .components
        .iter()
        .flat_map(|c| c.vertices.iter().copied())
        .collect();
    seen.sort();
    let all: Vec<VertexId> = graph.vertex_ids().collect();
    assert_eq!(seen, all);
    for component in &report.components {
        assert_eq!(component.edges.len() + 1, component.vertices.len());
    }
}

/// Test an unreachable end vertex
#[test]
fn test_search_failed_is_not_an_error() {
    let graph = Arc::new(MemoryGraph::from_edges(4, &[(0, 1, 1.0), (2, 3, 1.0)]).unwrap());
    let selection = Selection {
        start: Some(VertexId::new(0)),
        end: Some(VertexId::new(3)),
        stop: StoppingCondition::StopAtEnd,
        ..Selection::default()
    };
    let (controller, sink) =
        run_paused(graph, AlgorithmKind::Dijkstra, selection, Granularity::Action);

    let report = traversal_report(&controller);
    assert_eq!(report.outcome, TraversalOutcome::SearchFailed);
    assert_eq!(report.container.unwrap().added, report.container.unwrap().removed);
    assert!(sink.last_status().unwrap().starts_with("Search failed"));
}

/// Test the vertex extremes search through the controller
#[test]
fn test_vertex_extremes_runs_under_controller() {
    let graph = Arc::new(random_graph(9, 12, 0));
    let (controller, sink) = run_paused(
        graph,
        AlgorithmKind::VertexExtremes,
        Selection::default(),
        Granularity::Iteration,
    );

    assert_eq!(controller.execution_counts()["loopIncrement"], 11);
    // Vertices sit on the equator one degree apart
    assert_eq!(sink.panel()["leader:east"], "v11");
    assert_eq!(sink.panel()["leader:west"], "v0");
}

/// Test that an invalid selection leaves the controller selected
#[test]
fn test_invalid_selection_is_refused() {
    let sink = RecordingSink::new();
    let mut controller = Controller::new(&PlaybackConfig::default(), Box::new(sink.clone()));
    controller.load(cycle4(), DataKind::Graph);
    controller
        .select(
            AlgorithmKind::Traversal.build(None).unwrap(),
            Selection {
                start: Some(VertexId::new(17)),
                ..Selection::default()
            },
        )
        .unwrap();

    let err = controller.start_or_resume().unwrap_err();
    assert!(matches!(err, EngineError::Algorithm(_)));
    assert_eq!(controller.status(), AlgorithmStatus::Selected);
}
