/// Stepped Dijkstra demonstration
///
/// This example walks Dijkstra's algorithm over a handful of towns, one
/// iteration at a time, printing what each step did and the contents of
/// the discovery container. Set `RUST_LOG=debug` to also see every action
/// the controller performs.

use anyhow::Result;
use graph_stepper::algorithms::{AlgorithmKind, Selection, StoppingCondition, TraversalReport};
use graph_stepper::config::PlaybackConfig;
use graph_stepper::engine::{AlgorithmStatus, Controller, DataKind, Granularity, RecordingSink};
use graph_stepper::storage::GraphBuilder;
use std::sync::Arc;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut builder = GraphBuilder::new();
    let albany = builder.add_vertex("Albany", 42.65, -73.75)?;
    let troy = builder.add_vertex("Troy", 42.73, -73.69)?;
    let schenectady = builder.add_vertex("Schenectady", 42.81, -73.94)?;
    let saratoga = builder.add_vertex("Saratoga Springs", 43.08, -73.78)?;
    let glens_falls = builder.add_vertex("Glens Falls", 43.31, -73.64)?;
    builder.add_edge(albany, troy, "NY 2", 9.0)?;
    builder.add_edge(albany, schenectady, "I-90", 26.0)?;
    builder.add_edge(troy, schenectady, "NY 7", 24.0)?;
    builder.add_edge(schenectady, saratoga, "NY 50", 35.0)?;
    builder.add_edge(troy, saratoga, "US 4", 48.0)?;
    builder.add_edge(saratoga, glens_falls, "I-87", 30.0)?;
    let graph = Arc::new(builder.build());

    let sink = RecordingSink::new();
    let playback = PlaybackConfig {
        delay_ms: -1,
        granularity: Granularity::Iteration,
    };
    let mut controller = Controller::new(&playback, Box::new(sink.clone()));
    controller.load(graph, DataKind::Graph);
    controller.select(
        AlgorithmKind::Dijkstra.build(None)?,
        Selection {
            start: Some(albany),
            end: Some(glens_falls),
            stop: StoppingCondition::StopAtEnd,
            ..Selection::default()
        },
    )?;

    let mut iteration = 0;
    loop {
        let report = controller.step(Granularity::Iteration)?;
        iteration += 1;
        if let Some(last) = &report.last {
            println!("{:>3}. {}", iteration, last.description);
        }
        if let Some(ldv) = sink.panel().get("ldv") {
            println!("     {}", ldv);
        }
        if report.status == AlgorithmStatus::Complete {
            break;
        }
    }

    if let Some(algorithm) = controller.algorithm() {
        let report: TraversalReport = serde_json::from_value(algorithm.report())?;
        if let Some(path) = report.path {
            let stops: Vec<String> = path.vertices.iter().map(|v| v.to_string()).collect();
            println!("Route: {} ({} miles)", stops.join(" -> "), path.value);
        }
    }

    println!("Action counts:");
    for (label, count) in controller.execution_counts() {
        println!("  {:<20} {}", label, count);
    }

    Ok(())
}
