/// Graph Stepper
///
/// A stepped-execution engine for graph algorithms. Algorithms are written
/// as tables of small named actions; a controller performs them one
/// action, one iteration, or one whole run at a time, and reports every
/// change to a visualization sink.
///
/// # Architecture
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │           Graph Stepper                          │
/// ├──────────────────────────────────────────────────┤
/// │  ┌────────────────────────────────┐              │
/// │  │   Driver (tokio, continuations)│              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                   │
/// │  ┌────────────────────────────────┐              │
/// │  │   Controller (status, steps)   │──▶ Sink      │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                   │
/// │  ┌────────────────────────────────┐              │
/// │  │   Action Tables (algorithms)   │              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                   │
/// │  ┌────────────────────────────────┐              │
/// │  │   Graph Source (memory store)  │              │
/// │  └────────────────────────────────┘              │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// # Modules
///
/// - `types`: Core data types (VertexId, EdgeId, Vertex, Edge, TreePath)
/// - `storage`: Graph source abstraction and in-memory implementation
/// - `algorithms`: Discovery container, traversals, vertex extremes
/// - `engine`: Action tables, controller, driver and visualization sink
/// - `config`: Environment-driven configuration

pub mod types;
pub mod storage;
pub mod algorithms;
pub mod engine;
pub mod config;

// Re-export commonly used types
pub use types::{Edge, EdgeId, TreePath, Vertex, VertexId};

// Re-export storage types
pub use storage::{GraphBuilder, GraphSource, MemoryGraph, SharedGraph, StorageError, StorageResult};

// Re-export algorithm types
pub use algorithms::{
    AlgorithmError, AlgorithmKind, AlgorithmResult, DiscoveryContainer, LdvEntry, Selection,
    StoppingCondition, TraversalDiscipline, TraversalOutcome, TraversalReport, TraversalStrategy,
};

// Re-export engine types
pub use engine::{
    run_shared, spawn_driver, AlgorithmStatus, Controller, DataKind, EngineError, EngineResult,
    Granularity, SharedController, StepDelay, StepReport, VisualStyle, VisualizationSink,
};

pub use config::{LoggingConfig, PlaybackConfig, StepperConfig};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
