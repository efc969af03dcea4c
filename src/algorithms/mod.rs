/// Graph algorithms module
///
/// This module implements the algorithms the engine can step through:
/// - discovery: the discovery container shared by all graph searches
/// - traversal: BFS/DFS/RFS, Dijkstra and Prim as one state machine
/// - extremes: brute-force vertex extremes search

pub mod discovery;
pub mod extremes;
pub mod traversal;

pub use discovery::{Discipline, DiscoveryContainer, LdvEntry, LdvField};
pub use extremes::{ExtremesReport, VertexExtremes};
pub use traversal::{
    Component, Traversal, TraversalCounters, TraversalKind, TraversalOutcome, TraversalReport,
    TraversalStrategy,
};

use crate::engine::{EngineResult, SteppedAlgorithm};
use crate::storage::StorageError;
use crate::types::VertexId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Algorithm errors
#[derive(Error, Debug)]
pub enum AlgorithmError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Remove from empty {0:?} container")]
    EmptyContainer(Discipline),

    #[error("Graph algorithm error: {0}")]
    AlgorithmFailed(String),
}

pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// Termination policy of a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoppingCondition {
    /// Stop once the end vertex is added
    StopAtEnd,
    /// Span the component containing the start vertex
    #[default]
    FindReachable,
    /// Span every component
    FindAll,
}

impl FromStr for StoppingCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "stopatend" | "end" => Ok(StoppingCondition::StopAtEnd),
            "findreachable" | "reachable" => Ok(StoppingCondition::FindReachable),
            "findall" | "all" => Ok(StoppingCondition::FindAll),
            other => Err(format!("unknown stopping condition: {}", other)),
        }
    }
}

/// Discovery discipline of an unweighted traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TraversalDiscipline {
    /// Breadth-first
    #[default]
    Bfs,
    /// Depth-first
    Dfs,
    /// Random-first
    Rfs,
}

impl FromStr for TraversalDiscipline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(TraversalDiscipline::Bfs),
            "dfs" => Ok(TraversalDiscipline::Dfs),
            "rfs" => Ok(TraversalDiscipline::Rfs),
            other => Err(format!("unknown traversal discipline: {}", other)),
        }
    }
}

/// User choices read by an algorithm when it is prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Start vertex; vertex 0 when absent
    pub start: Option<VertexId>,
    /// End vertex, required by `StopAtEnd`
    pub end: Option<VertexId>,
    pub stop: StoppingCondition,
    /// Only read by graph traversals
    pub discipline: TraversalDiscipline,
}

/// Algorithms available for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// BFS, DFS or RFS, per the selection's discipline
    Traversal,
    Dijkstra,
    Prim,
    VertexExtremes,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::Traversal,
        AlgorithmKind::Dijkstra,
        AlgorithmKind::Prim,
        AlgorithmKind::VertexExtremes,
    ];

    /// Construct a fresh algorithm instance
    ///
    /// `seed` fixes the removal order of random-first traversals.
    pub fn build(&self, seed: Option<u64>) -> EngineResult<Box<dyn SteppedAlgorithm>> {
        Ok(match self {
            AlgorithmKind::Traversal => Box::new(Traversal::machine_for_selection(seed)?),
            AlgorithmKind::Dijkstra => {
                Box::new(Traversal::machine(TraversalStrategy::dijkstra(), seed)?)
            }
            AlgorithmKind::Prim => Box::new(Traversal::machine(TraversalStrategy::prim(), seed)?),
            AlgorithmKind::VertexExtremes => Box::new(VertexExtremes::machine()?),
        })
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmKind::Traversal => "Graph Traversal",
            AlgorithmKind::Dijkstra => "Dijkstra's Algorithm",
            AlgorithmKind::Prim => "Prim's Algorithm",
            AlgorithmKind::VertexExtremes => "Vertex Extremes Search",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stopping_condition() {
        assert_eq!("stop-at-end".parse::<StoppingCondition>(), Ok(StoppingCondition::StopAtEnd));
        assert_eq!("FindReachable".parse::<StoppingCondition>(), Ok(StoppingCondition::FindReachable));
        assert_eq!("all".parse::<StoppingCondition>(), Ok(StoppingCondition::FindAll));
        assert!("sideways".parse::<StoppingCondition>().is_err());
    }

    #[test]
    fn test_parse_discipline() {
        assert_eq!("DFS".parse::<TraversalDiscipline>(), Ok(TraversalDiscipline::Dfs));
        assert!("xfs".parse::<TraversalDiscipline>().is_err());
    }

    #[test]
    fn test_every_kind_builds() {
        for kind in AlgorithmKind::ALL {
            let algorithm = kind.build(Some(1)).unwrap();
            assert!(!algorithm.action_names().is_empty());
            assert_eq!(algorithm.next_action().as_deref(), Some("START"));
        }
    }
}
