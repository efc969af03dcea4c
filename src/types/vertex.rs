use super::ids::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};

/// Vertex (waypoint) in the graph
///
/// Represents a graph vertex with:
/// - Dense identifier (VertexId)
/// - Label (waypoint name shown to the learner)
/// - Coordinates (latitude/longitude in degrees)
/// - Incident edges, in load order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vertex {
    /// Dense identifier
    pub id: VertexId,

    /// Vertex label (e.g., "I-90@Exit12")
    pub label: String,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lng: f64,

    /// Incident edges in the order they were added to the graph
    pub edges: Vec<EdgeId>,
}

impl Vertex {
    /// Create a new vertex with no incident edges
    pub fn new(id: VertexId, label: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id,
            label: label.into(),
            lat,
            lng,
            edges: Vec::new(),
        }
    }

    /// Number of incident edges
    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    /// Check if an edge is incident to this vertex
    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }
}
