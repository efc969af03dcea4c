/// Property tests for the discovery container and the traversal machine

use graph_stepper::algorithms::discovery::{higher_value_first, lower_value_first};
use graph_stepper::algorithms::{
    DiscoveryContainer, LdvEntry, Selection, StoppingCondition, Traversal, TraversalStrategy,
};
use graph_stepper::engine::{ActionContext, NullSink, SteppedAlgorithm};
use graph_stepper::storage::MemoryGraph;
use graph_stepper::types::VertexId;
use proptest::collection::vec;
use proptest::prelude::*;

fn seeded(values: &[u8]) -> Vec<LdvEntry> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| LdvEntry::seed(VertexId::new(i as u32), f64::from(v)))
        .collect()
}

fn drain(container: &mut DiscoveryContainer) -> Vec<LdvEntry> {
    let mut out = Vec::new();
    while let Ok(entry) = container.remove() {
        out.push(entry);
    }
    out
}

fn arb_graph() -> impl Strategy<Value = MemoryGraph> {
    (1u32..16)
        .prop_flat_map(|n| (Just(n), vec((0..n, 0..n, 1u32..10), 0..32)))
        .prop_map(|(n, edges)| {
            let edges: Vec<(u32, u32, f64)> = edges
                .into_iter()
                .map(|(a, b, len)| (a, b, f64::from(len)))
                .collect();
            MemoryGraph::from_edges(n, &edges).unwrap()
        })
}

fn arb_strategy() -> impl Strategy<Value = TraversalStrategy> {
    prop_oneof![
        Just(TraversalStrategy::bfs()),
        Just(TraversalStrategy::dfs()),
        Just(TraversalStrategy::rfs()),
        Just(TraversalStrategy::dijkstra()),
        Just(TraversalStrategy::prim()),
    ]
}

fn find_all() -> Selection {
    Selection {
        start: Some(VertexId::new(0)),
        stop: StoppingCondition::FindAll,
        ..Selection::default()
    }
}

proptest! {
    #[test]
    fn prop_priority_sorted_with_fifo_ties(values in vec(0u8..8, 0..64)) {
        let mut container = DiscoveryContainer::priority(lower_value_first);
        for entry in seeded(&values) {
            container.add(entry);
        }
        let out = drain(&mut container);

        prop_assert_eq!(out.len(), values.len());
        for pair in out.windows(2) {
            prop_assert!(pair[0].value() <= pair[1].value());
            if pair[0].value() == pair[1].value() {
                prop_assert!(pair[0].vertex() < pair[1].vertex());
            }
        }
    }

    #[test]
    fn prop_higher_first_is_descending(values in vec(0u8..50, 0..64)) {
        let mut container = DiscoveryContainer::priority(higher_value_first);
        for entry in seeded(&values) {
            container.add(entry);
        }
        let out = drain(&mut container);
        for pair in out.windows(2) {
            prop_assert!(pair[0].value() >= pair[1].value());
        }
    }

    #[test]
    fn prop_stack_and_queue_orders(values in vec(any::<u8>(), 0..64)) {
        let entries = seeded(&values);

        let mut queue = DiscoveryContainer::queue();
        let mut stack = DiscoveryContainer::stack();
        for &entry in &entries {
            queue.add(entry);
            stack.add(entry);
        }

        prop_assert_eq!(drain(&mut queue), entries.clone());
        let mut reversed = entries;
        reversed.reverse();
        prop_assert_eq!(drain(&mut stack), reversed);
    }

    #[test]
    fn prop_random_removes_each_entry_once(values in vec(any::<u8>(), 0..64), seed in any::<u64>()) {
        let mut container = DiscoveryContainer::random(Some(seed));
        for entry in seeded(&values) {
            container.add(entry);
        }
        let mut removed: Vec<VertexId> = drain(&mut container).iter().map(|e| e.vertex()).collect();
        removed.sort();

        let expected: Vec<VertexId> = (0..values.len() as u32).map(VertexId::new).collect();
        prop_assert_eq!(removed, expected);

        let stats = container.stats();
        prop_assert_eq!(stats.added, values.len() as u64);
        prop_assert_eq!(stats.removed, values.len() as u64);
        prop_assert_eq!(stats.peak_len, values.len());
    }

    #[test]
    fn prop_single_actions_match_full_run(graph in arb_graph(), strategy in arb_strategy()) {
        let mut stepped = Traversal::machine(strategy, Some(5)).unwrap();
        let mut whole = Traversal::machine(strategy, Some(5)).unwrap();
        stepped.prepare(&graph, &find_all()).unwrap();
        whole.prepare(&graph, &find_all()).unwrap();

        let mut sink = NullSink;
        let mut ctx = ActionContext { graph: &graph, sink: &mut sink };
        let mut iterations = 0u64;
        while !stepped.is_done() {
            if stepped.perform(&mut ctx).unwrap().iteration_done {
                iterations += 1;
            }
        }
        whole.run_to_done(&mut ctx).unwrap();

        prop_assert_eq!(stepped.state().snapshot(), whole.state().snapshot());

        // One iteration per removal, plus one per finished component
        let report = stepped.state().snapshot();
        let removed = report.container.unwrap().removed;
        prop_assert_eq!(iterations, removed + report.components.len() as u64);
    }

    #[test]
    fn prop_find_all_spans_forest(graph in arb_graph(), strategy in arb_strategy()) {
        let mut machine = Traversal::machine(strategy, Some(9)).unwrap();
        machine.prepare(&graph, &find_all()).unwrap();
        let mut sink = NullSink;
        let mut ctx = ActionContext { graph: &graph, sink: &mut sink };
        machine.run_to_done(&mut ctx).unwrap();

        let state = machine.state();
        let n = graph.vertices().len();
        prop_assert_eq!(state.tree().len(), n);
        let tree_edges = state.tree().iter().filter(|e| e.via_edge().is_some()).count();
        prop_assert_eq!(tree_edges + state.components().len(), n);
        for v in 0..n as u32 {
            prop_assert!(state.is_added(VertexId::new(v)));
        }
    }
}
