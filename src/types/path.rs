use super::ids::{EdgeId, VertexId};
use crate::storage::GraphSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for TreePath operations
#[derive(Error, Debug, PartialEq)]
pub enum PathError {
    #[error("Path is empty")]
    EmptyPath,

    #[error("Path vertices and edges count mismatch: {vertices} vertices, {edges} edges")]
    CountMismatch { vertices: usize, edges: usize },

    #[error("Path edge {edge} at position {pos} is not in the graph")]
    UnknownEdge { pos: usize, edge: EdgeId },

    #[error("Path discontinuity at position {pos}: edge {edge} does not connect {from} to {to}")]
    Discontinuity {
        pos: usize,
        edge: EdgeId,
        from: VertexId,
        to: VertexId,
    },
}

/// TreePath: a path recovered from a spanning tree
///
/// A path consists of an alternating sequence of vertices and edges:
/// (v1) -[e1]- (v2) -[e2]- (v3) ... -[en]- (vn+1)
///
/// Invariants:
/// - vertices.len() = edges.len() + 1
/// - edges[i] connects vertices[i] and vertices[i+1]
///
/// `value` is the value the traversal carried into the last vertex: hop
/// count for unweighted traversals, total length for Dijkstra.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreePath {
    /// Vertices in the path, start first
    pub vertices: Vec<VertexId>,

    /// Edges in the path
    pub edges: Vec<EdgeId>,

    /// Value recorded for the final vertex
    pub value: f64,
}

impl TreePath {
    /// Create a path with a single vertex (no edges)
    pub fn new(start: VertexId) -> Self {
        Self {
            vertices: vec![start],
            edges: Vec::new(),
            value: 0.0,
        }
    }

    /// Create a path from vertices and edges
    ///
    /// # Errors
    /// Returns an error if the vertex and edge counts do not line up
    pub fn from_parts(
        vertices: Vec<VertexId>,
        edges: Vec<EdgeId>,
        value: f64,
    ) -> Result<Self, PathError> {
        if vertices.is_empty() {
            return Err(PathError::EmptyPath);
        }
        if vertices.len() != edges.len() + 1 {
            return Err(PathError::CountMismatch {
                vertices: vertices.len(),
                edges: edges.len(),
            });
        }
        Ok(Self {
            vertices,
            edges,
            value,
        })
    }

    /// Validate the continuity of the path against a graph
    pub fn validate(&self, graph: &dyn GraphSource) -> Result<(), PathError> {
        for (pos, &edge_id) in self.edges.iter().enumerate() {
            let edge = graph
                .edge(edge_id)
                .map_err(|_| PathError::UnknownEdge { pos, edge: edge_id })?;
            let from = self.vertices[pos];
            let to = self.vertices[pos + 1];

            if edge.other_endpoint(from) != Some(to) {
                return Err(PathError::Discontinuity {
                    pos,
                    edge: edge_id,
                    from,
                    to,
                });
            }
        }

        Ok(())
    }

    /// Get the start vertex of the path
    pub fn start(&self) -> Option<VertexId> {
        self.vertices.first().copied()
    }

    /// Get the end vertex of the path
    pub fn end(&self) -> Option<VertexId> {
        self.vertices.last().copied()
    }

    /// Get the length of the path (number of edges)
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the path has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Check if the path contains a vertex
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains(&id)
    }

    /// Check if the path contains an edge
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    /// Sum of the lengths of the path's edges
    pub fn total_length(&self, graph: &dyn GraphSource) -> f64 {
        self.edges
            .iter()
            .filter_map(|&e| graph.edge(e).ok())
            .map(|e| e.length)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GraphBuilder;

    fn line_graph() -> crate::storage::MemoryGraph {
        // 0 - 1 - 2
        let mut b = GraphBuilder::new();
        let a = b.add_vertex("A", 0.0, 0.0).unwrap();
        let c = b.add_vertex("B", 0.0, 1.0).unwrap();
        let d = b.add_vertex("C", 0.0, 2.0).unwrap();
        b.add_edge(a, c, "AB", 2.0).unwrap();
        b.add_edge(c, d, "BC", 3.0).unwrap();
        b.build()
    }

    #[test]
    fn test_path_single_vertex() {
        let path = TreePath::new(VertexId::new(0));
        assert!(path.is_empty());
        assert_eq!(path.start(), Some(VertexId::new(0)));
        assert_eq!(path.end(), Some(VertexId::new(0)));
    }

    #[test]
    fn test_path_count_mismatch() {
        let result = TreePath::from_parts(vec![VertexId::new(0)], vec![EdgeId::new(0)], 1.0);
        assert_eq!(
            result.unwrap_err(),
            PathError::CountMismatch {
                vertices: 1,
                edges: 1
            }
        );
        assert_eq!(
            TreePath::from_parts(vec![], vec![], 0.0).unwrap_err(),
            PathError::EmptyPath
        );
    }

    #[test]
    fn test_path_validate() {
        let graph = line_graph();
        let path = TreePath::from_parts(
            vec![VertexId::new(0), VertexId::new(1), VertexId::new(2)],
            vec![EdgeId::new(0), EdgeId::new(1)],
            5.0,
        )
        .unwrap();

        assert!(path.validate(&graph).is_ok());
        assert_eq!(path.len(), 2);
        assert_eq!(path.total_length(&graph), 5.0);
        assert!(path.contains_vertex(VertexId::new(1)));
        assert!(path.contains_edge(EdgeId::new(1)));
    }

    #[test]
    fn test_path_discontinuous() {
        let graph = line_graph();
        // Edge 1 connects 1-2, not 0-2
        let path = TreePath::from_parts(
            vec![VertexId::new(0), VertexId::new(2)],
            vec![EdgeId::new(1)],
            3.0,
        )
        .unwrap();

        assert!(matches!(
            path.validate(&graph),
            Err(PathError::Discontinuity { pos: 0, .. })
        ));
    }
}
