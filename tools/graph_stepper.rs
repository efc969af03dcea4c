use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use graph_stepper::algorithms::{AlgorithmKind, Selection, StoppingCondition, TraversalDiscipline};
use graph_stepper::config::{LoggingConfig, StepperConfig};
use graph_stepper::engine::{
    run_shared, AlgorithmStatus, Controller, DataKind, Granularity, TracingSink, VisualStyle,
    VisualizationSink,
};
use graph_stepper::storage::{GraphBuilder, GraphSource, MemoryGraph};
use graph_stepper::types::{EdgeId, VertexId};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GraphType {
    /// Ring of n vertices
    Cycle,
    /// Square grid with about n vertices
    Grid,
    /// Random geometric graph with a target average degree
    Random,
    /// n/2 disconnected edges
    Pairs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmChoice {
    Bfs,
    Dfs,
    Rfs,
    Dijkstra,
    Prim,
    Extremes,
}

impl AlgorithmChoice {
    fn selection_parts(&self) -> (AlgorithmKind, TraversalDiscipline) {
        match self {
            AlgorithmChoice::Bfs => (AlgorithmKind::Traversal, TraversalDiscipline::Bfs),
            AlgorithmChoice::Dfs => (AlgorithmKind::Traversal, TraversalDiscipline::Dfs),
            AlgorithmChoice::Rfs => (AlgorithmKind::Traversal, TraversalDiscipline::Rfs),
            AlgorithmChoice::Dijkstra => (AlgorithmKind::Dijkstra, TraversalDiscipline::Bfs),
            AlgorithmChoice::Prim => (AlgorithmKind::Prim, TraversalDiscipline::Bfs),
            AlgorithmChoice::Extremes => (AlgorithmKind::VertexExtremes, TraversalDiscipline::Bfs),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StopChoice {
    StopAtEnd,
    FindReachable,
    FindAll,
}

impl From<StopChoice> for StoppingCondition {
    fn from(choice: StopChoice) -> Self {
        match choice {
            StopChoice::StopAtEnd => StoppingCondition::StopAtEnd,
            StopChoice::FindReachable => StoppingCondition::FindReachable,
            StopChoice::FindAll => StoppingCondition::FindAll,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "graph_stepper")]
#[command(about = "Step through a graph algorithm on a generated graph", long_about = None)]
struct Args {
    /// Type of graph to generate
    #[arg(short, long, value_enum, default_value_t = GraphType::Cycle)]
    graph_type: GraphType,

    /// Number of vertices
    #[arg(short = 'n', long, default_value_t = 12)]
    vertices: usize,

    /// Average degree for random graphs
    #[arg(short = 'd', long, default_value_t = 3)]
    avg_degree: usize,

    /// Algorithm to run
    #[arg(short, long, value_enum, default_value_t = AlgorithmChoice::Bfs)]
    algorithm: AlgorithmChoice,

    /// Stopping condition of traversals
    #[arg(long, value_enum, default_value_t = StopChoice::FindReachable)]
    stop: StopChoice,

    /// Start vertex index
    #[arg(long)]
    start: Option<u32>,

    /// End vertex index, required with stop-at-end
    #[arg(long)]
    end: Option<u32>,

    /// Delay between steps in ms (0 = run to completion, negative = single step)
    #[arg(long, allow_negative_numbers = true)]
    delay_ms: Option<i64>,

    /// Unit of work per step (action, iteration, completion)
    #[arg(long)]
    granularity: Option<Granularity>,

    /// Random seed for the graph and for random-first discovery
    #[arg(long)]
    seed: Option<u64>,

    /// Print the algorithm report as JSON
    #[arg(long)]
    json: bool,

    /// Send visualization updates to the debug log instead of recording them
    #[arg(long)]
    trace_events: bool,
}

/// Sink that keeps only the latest status line
#[derive(Clone, Default)]
struct StatusSink {
    last: Arc<Mutex<Option<String>>>,
}

impl StatusSink {
    fn last_status(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

impl VisualizationSink for StatusSink {
    fn highlight(&mut self, _code_id: &str, _style: VisualStyle) {}

    fn mark_vertex(&mut self, _vertex: VertexId, _style: VisualStyle, _z_order: i32, _hidden: bool) {
    }

    fn mark_edge(&mut self, _edge: EdgeId, _style: VisualStyle, _hidden: bool) {}

    fn set_status_text(&mut self, message: &str) {
        *self.last.lock() = Some(message.to_string());
    }

    fn set_panel_entry(&mut self, _key: &str, _html: &str) {}
}

struct GraphGenerator {
    rng: StdRng,
}

impl GraphGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn generate(&mut self, graph_type: GraphType, n: usize, avg_degree: usize) -> Result<MemoryGraph> {
        if n == 0 {
            bail!("a graph needs at least one vertex");
        }
        let graph = match graph_type {
            GraphType::Cycle => self.generate_cycle(n)?,
            GraphType::Grid => self.generate_grid(n)?,
            GraphType::Random => self.generate_random(n, avg_degree)?,
            GraphType::Pairs => self.generate_pairs(n)?,
        };
        Ok(graph)
    }

    /// Vertices on a circle, each joined to the next
    fn generate_cycle(&mut self, n: usize) -> Result<MemoryGraph> {
        let mut builder = GraphBuilder::with_capacity(n, n);
        for i in 0..n {
            let angle = std::f64::consts::TAU * i as f64 / n as f64;
            builder.add_vertex(format!("C{}", i), angle.sin(), angle.cos())?;
        }
        for i in 0..n.saturating_sub(1) {
            self.join(&mut builder, i, i + 1)?;
        }
        if n > 2 {
            self.join(&mut builder, n - 1, 0)?;
        }
        Ok(builder.build())
    }

    fn generate_grid(&mut self, n: usize) -> Result<MemoryGraph> {
        let side = (n as f64).sqrt().ceil() as usize;
        let mut builder = GraphBuilder::with_capacity(side * side, 2 * side * side);
        for row in 0..side {
            for col in 0..side {
                builder.add_vertex(format!("G{}_{}", row, col), row as f64, col as f64)?;
            }
        }
        for row in 0..side {
            for col in 0..side {
                let here = row * side + col;
                if col + 1 < side {
                    self.join(&mut builder, here, here + 1)?;
                }
                if row + 1 < side {
                    self.join(&mut builder, here, here + side)?;
                }
            }
        }
        Ok(builder.build())
    }

    fn generate_random(&mut self, n: usize, avg_degree: usize) -> Result<MemoryGraph> {
        let target = (n * avg_degree) / 2;
        let possible = n * n.saturating_sub(1) / 2;
        let mut builder = GraphBuilder::with_capacity(n, target.min(possible));
        for i in 0..n {
            let lat = self.rng.gen_range(40.0..45.0);
            let lng = self.rng.gen_range(-80.0..-72.0);
            builder.add_vertex(format!("R{}", i), lat, lng)?;
        }

        let mut seen = HashSet::new();
        while seen.len() < target.min(possible) {
            let a = self.rng.gen_range(0..n);
            let b = self.rng.gen_range(0..n);
            if a == b || !seen.insert((a.min(b), a.max(b))) {
                continue;
            }
            self.join(&mut builder, a, b)?;
        }
        Ok(builder.build())
    }

    fn generate_pairs(&mut self, n: usize) -> Result<MemoryGraph> {
        let mut builder = GraphBuilder::with_capacity(n, n / 2);
        for i in 0..n {
            builder.add_vertex(format!("P{}", i), (i / 2) as f64, (i % 2) as f64)?;
        }
        for i in (0..n.saturating_sub(1)).step_by(2) {
            self.join(&mut builder, i, i + 1)?;
        }
        Ok(builder.build())
    }

    /// Edge between two built vertices, as long as the straight line
    /// between them plus a little noise
    fn join(&mut self, builder: &mut GraphBuilder, a: usize, b: usize) -> Result<()> {
        let (va, vb) = (VertexId::new(a as u32), VertexId::new(b as u32));
        let noise: f64 = self.rng.gen_range(0.0..0.1);
        let length = builder.distance(va, vb).unwrap_or(1.0) + noise;
        builder
            .add_edge(va, vb, format!("{}-{}", a, b), length)
            .with_context(|| format!("joining {} and {}", a, b))?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = StepperConfig::from_env()?;
    if let Some(delay_ms) = args.delay_ms {
        config.playback.delay_ms = delay_ms;
    }
    if let Some(granularity) = args.granularity {
        config.playback.granularity = granularity;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }

    init_logging(&config.logging)?;

    let graph = GraphGenerator::new(config.random_seed.unwrap_or(42)).generate(
        args.graph_type,
        args.vertices,
        args.avg_degree,
    )?;
    tracing::info!(
        "Generated {:?} graph: {} vertices, {} edges",
        args.graph_type,
        graph.vertex_count(),
        graph.edge_count()
    );

    let sink = StatusSink::default();
    let output: Box<dyn VisualizationSink> = if args.trace_events {
        Box::new(TracingSink)
    } else {
        Box::new(sink.clone())
    };
    let mut controller = Controller::new(&config.playback, output);
    controller.load(Arc::new(graph), DataKind::Graph);

    let (kind, discipline) = args.algorithm.selection_parts();
    let selection = Selection {
        start: args.start.map(VertexId::new),
        end: args.end.map(VertexId::new),
        stop: args.stop.into(),
        discipline,
    };
    controller.select(kind.build(config.random_seed)?, selection)?;

    let granularity = controller.granularity();
    let shared = Arc::new(Mutex::new(controller));
    let mut status = run_shared(shared.clone()).await?;

    // Single stepping hands control back after every step
    while status == AlgorithmStatus::Paused {
        let report = shared.lock().step(granularity)?;
        if let Some(last) = &report.last {
            println!("[{}] {}", last.label, last.description);
        }
        status = report.status;
    }

    let controller = shared.lock();
    println!("{} finished: {}", kind, status);
    println!("Actions performed: {}", controller.actions_performed());
    for (label, count) in controller.execution_counts() {
        println!("  {:<20} {}", label, count);
    }
    if let Some(message) = sink.last_status() {
        println!("{}", message);
    }

    if args.json {
        if let Some(algorithm) = controller.algorithm() {
            println!("{}", serde_json::to_string_pretty(&algorithm.report())?);
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_sink_keeps_latest_line() {
        let sink = StatusSink::default();
        let mut output: Box<dyn VisualizationSink> = Box::new(sink.clone());
        assert_eq!(sink.last_status(), None);

        output.mark_vertex(VertexId::new(0), VisualStyle::Added, 1, false);
        output.set_status_text("first");
        output.set_panel_entry("ldv", "[]");
        output.set_status_text("second");

        assert_eq!(sink.last_status().as_deref(), Some("second"));
    }

    #[test]
    fn test_generated_pairs_are_disjoint() {
        let graph = GraphGenerator::new(7).generate(GraphType::Pairs, 6, 0).unwrap();
        assert_eq!(graph.vertex_count(), 6);
        assert_eq!(graph.edge_count(), 3);
    }
}
