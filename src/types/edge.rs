use super::ids::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};

/// Edge (road segment) in the graph
///
/// Represents an undirected edge with:
/// - Dense identifier (EdgeId)
/// - Two endpoint vertex IDs
/// - Label (route names along the segment)
/// - Length used by weighted traversals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    /// Dense identifier
    pub id: EdgeId,

    /// First endpoint
    pub v1: VertexId,

    /// Second endpoint
    pub v2: VertexId,

    /// Edge label (e.g., "I-90,US20")
    pub label: String,

    /// Edge length, non-negative
    pub length: f64,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        id: EdgeId,
        v1: VertexId,
        v2: VertexId,
        label: impl Into<String>,
        length: f64,
    ) -> Self {
        Self {
            id,
            v1,
            v2,
            label: label.into(),
            length,
        }
    }

    /// Get the endpoint that is not `vertex`
    ///
    /// Returns `None` if `vertex` is not an endpoint. For a loop edge
    /// both endpoints are `vertex`, so `vertex` itself is returned.
    pub fn other_endpoint(&self, vertex: VertexId) -> Option<VertexId> {
        if self.v1 == vertex {
            Some(self.v2)
        } else if self.v2 == vertex {
            Some(self.v1)
        } else {
            None
        }
    }

    /// Check if `vertex` is one of the endpoints
    pub fn connects(&self, vertex: VertexId) -> bool {
        self.v1 == vertex || self.v2 == vertex
    }

    /// Check if the edge starts and ends at the same vertex
    pub fn is_loop(&self) -> bool {
        self.v1 == self.v2
    }
}
