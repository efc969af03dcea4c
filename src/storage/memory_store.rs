/// In-memory graph data source
///
/// Graphs are assembled with a `GraphBuilder` and frozen into a
/// `MemoryGraph`; algorithms only ever see the frozen form.

use super::{GraphSource, StorageError, StorageResult};
use crate::types::{Edge, EdgeId, Vertex, VertexId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Immutable in-memory graph
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl MemoryGraph {
    /// Build a graph with `vertex_count` unlabeled vertices and the given
    /// `(v1, v2, length)` edges
    ///
    /// Vertices are labeled by index and placed on the equator one degree
    /// apart. Useful for tests and generated graphs.
    pub fn from_edges(vertex_count: u32, edges: &[(u32, u32, f64)]) -> StorageResult<Self> {
        let mut builder = GraphBuilder::new();
        for i in 0..vertex_count {
            builder.add_vertex(i.to_string(), 0.0, f64::from(i))?;
        }
        for &(v1, v2, length) in edges {
            builder.add_edge(
                VertexId::new(v1),
                VertexId::new(v2),
                format!("{}-{}", v1, v2),
                length,
            )?;
        }
        Ok(builder.build())
    }

    /// All vertices in index order
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All edges in index order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl GraphSource for MemoryGraph {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn vertex(&self, id: VertexId) -> StorageResult<&Vertex> {
        self.vertices
            .get(id.index())
            .ok_or(StorageError::VertexNotFound(id))
    }

    fn edge(&self, id: EdgeId) -> StorageResult<&Edge> {
        self.edges
            .get(id.index())
            .ok_or(StorageError::EdgeNotFound(id))
    }
}

/// Builder for `MemoryGraph`
///
/// Edges are appended to both endpoints' incident lists in the order they
/// are added, which fixes the neighbor iteration order of traversals.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with preallocated capacity
    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
        }
    }

    /// Add a vertex and return its id
    ///
    /// # Errors
    /// * `CapacityExceeded` if the vertex id space is exhausted
    pub fn add_vertex(
        &mut self,
        label: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> StorageResult<VertexId> {
        ensure_capacity(self.vertices.len(), "vertices")?;
        let id = VertexId::from_index(self.vertices.len());
        self.vertices.push(Vertex::new(id, label, lat, lng));
        Ok(id)
    }

    /// Add an undirected edge between two existing vertices
    ///
    /// # Errors
    /// * `InvalidEndpoint` if either endpoint has not been added
    /// * `InvalidLength` if `length` is negative or NaN
    /// * `CapacityExceeded` if the edge id space is exhausted
    pub fn add_edge(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        label: impl Into<String>,
        length: f64,
    ) -> StorageResult<EdgeId> {
        let label = label.into();

        for endpoint in [v1, v2] {
            if endpoint.index() >= self.vertices.len() {
                return Err(StorageError::InvalidEndpoint { label, endpoint });
            }
        }
        if length.is_nan() || length < 0.0 {
            return Err(StorageError::InvalidLength { label, length });
        }
        ensure_capacity(self.edges.len(), "edges")?;

        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(Edge::new(id, v1, v2, label, length));
        self.vertices[v1.index()].edges.push(id);
        if v1 != v2 {
            self.vertices[v2.index()].edges.push(id);
        }

        Ok(id)
    }

    /// Number of vertices added so far
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Straight-line distance between two added vertices in coordinate
    /// units, `None` if either is missing
    pub fn distance(&self, v1: VertexId, v2: VertexId) -> Option<f64> {
        let a = self.vertices.get(v1.index())?;
        let b = self.vertices.get(v2.index())?;
        Some((a.lat - b.lat).hypot(a.lng - b.lng))
    }

    /// Freeze the builder into a graph
    pub fn build(self) -> MemoryGraph {
        debug!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "graph built"
        );
        MemoryGraph {
            vertices: self.vertices,
            edges: self.edges,
        }
    }
}

/// Ids are `u32`, so a graph holds at most `u32::MAX` of each kind
fn ensure_capacity(len: usize, kind: &str) -> StorageResult<()> {
    if len >= u32::MAX as usize {
        return Err(StorageError::CapacityExceeded(format!(
            "more than {} {}",
            u32::MAX, kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_distance() {
        let mut b = GraphBuilder::new();
        let a = b.add_vertex("A", 0.0, 0.0).unwrap();
        let c = b.add_vertex("B", 3.0, 4.0).unwrap();
        assert_eq!(b.distance(a, c), Some(5.0));
        assert_eq!(b.distance(a, VertexId::new(7)), None);
    }

    #[test]
    fn test_builder_adjacency() {
        let mut b = GraphBuilder::new();
        let a = b.add_vertex("A", 0.0, 0.0).unwrap();
        let c = b.add_vertex("B", 1.0, 1.0).unwrap();
        let d = b.add_vertex("C", 2.0, 2.0).unwrap();
        let e0 = b.add_edge(a, c, "AB", 1.0).unwrap();
        let e1 = b.add_edge(a, d, "AC", 2.0).unwrap();
        let graph = b.build();

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.incident_edges(a).unwrap(), &[e0, e1]);
        assert_eq!(graph.incident_edges(c).unwrap(), &[e0]);
        assert_eq!(graph.edge(e1).unwrap().other_endpoint(a), Some(d));
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut b = GraphBuilder::new();
        let a = b.add_vertex("A", 0.0, 0.0).unwrap();
        let result = b.add_edge(a, VertexId::new(5), "bad", 1.0);
        assert!(matches!(
            result,
            Err(StorageError::InvalidEndpoint { endpoint, .. }) if endpoint == VertexId::new(5)
        ));
    }

    #[test]
    fn test_invalid_length() {
        let mut b = GraphBuilder::new();
        let a = b.add_vertex("A", 0.0, 0.0).unwrap();
        let c = b.add_vertex("B", 0.0, 0.0).unwrap();
        assert!(matches!(
            b.add_edge(a, c, "neg", -1.0),
            Err(StorageError::InvalidLength { .. })
        ));
        assert!(matches!(
            b.add_edge(a, c, "nan", f64::NAN),
            Err(StorageError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_loop_edge_listed_once() {
        let mut b = GraphBuilder::new();
        let a = b.add_vertex("A", 0.0, 0.0).unwrap();
        b.add_edge(a, a, "loop", 0.5).unwrap();
        let graph = b.build();
        assert_eq!(graph.incident_edges(a).unwrap().len(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        assert!(ensure_capacity(0, "vertices").is_ok());
        assert!(ensure_capacity(u32::MAX as usize - 1, "vertices").is_ok());
        assert!(matches!(
            ensure_capacity(u32::MAX as usize, "vertices"),
            Err(StorageError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn test_lookup_errors() {
        let graph = MemoryGraph::from_edges(2, &[(0, 1, 1.0)]).unwrap();
        assert_eq!(
            graph.vertex(VertexId::new(9)).unwrap_err(),
            StorageError::VertexNotFound(VertexId::new(9))
        );
        assert_eq!(
            graph.edge(EdgeId::new(3)).unwrap_err(),
            StorageError::EdgeNotFound(EdgeId::new(3))
        );
        assert!(graph.contains_vertex(VertexId::new(1)));
        assert!(!graph.contains_vertex(VertexId::new(2)));
    }

    #[test]
    fn test_vertex_ids_in_order() {
        let graph = MemoryGraph::from_edges(3, &[]).unwrap();
        let ids: Vec<_> = graph.vertex_ids().collect();
        assert_eq!(ids, vec![VertexId::new(0), VertexId::new(1), VertexId::new(2)]);
    }
}
