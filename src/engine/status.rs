use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of the controller
///
/// The `*Loaded` statuses record what kind of data is available; the
/// last four describe an algorithm run and all imply data is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmStatus {
    NoData,
    GraphLoaded,
    WaypointLoaded,
    NearMissLoaded,
    PathLoaded,
    ListLoaded,
    Selected,
    Running,
    Paused,
    Complete,
}

impl AlgorithmStatus {
    /// Check whether some data is loaded
    pub fn has_data(&self) -> bool {
        !matches!(self, AlgorithmStatus::NoData)
    }

    /// Check whether an algorithm execution exists (started, maybe finished)
    pub fn has_execution(&self) -> bool {
        matches!(
            self,
            AlgorithmStatus::Running | AlgorithmStatus::Paused | AlgorithmStatus::Complete
        )
    }
}

impl fmt::Display for AlgorithmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmStatus::NoData => "no data",
            AlgorithmStatus::GraphLoaded => "graph loaded",
            AlgorithmStatus::WaypointLoaded => "waypoints loaded",
            AlgorithmStatus::NearMissLoaded => "near-miss points loaded",
            AlgorithmStatus::PathLoaded => "path loaded",
            AlgorithmStatus::ListLoaded => "list loaded",
            AlgorithmStatus::Selected => "selected",
            AlgorithmStatus::Running => "running",
            AlgorithmStatus::Paused => "paused",
            AlgorithmStatus::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Kind of data handed to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    Graph,
    Waypoints,
    NearMiss,
    Path,
    List,
}

impl DataKind {
    /// Status reached after loading this kind of data
    pub fn loaded_status(&self) -> AlgorithmStatus {
        match self {
            DataKind::Graph => AlgorithmStatus::GraphLoaded,
            DataKind::Waypoints => AlgorithmStatus::WaypointLoaded,
            DataKind::NearMiss => AlgorithmStatus::NearMissLoaded,
            DataKind::Path => AlgorithmStatus::PathLoaded,
            DataKind::List => AlgorithmStatus::ListLoaded,
        }
    }
}
