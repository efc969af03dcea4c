/// Graph data source abstraction for the stepping engine
///
/// This module provides the read-only graph interface algorithms run against:
/// - GraphSource trait: vertex/edge lookup and adjacency
/// - MemoryGraph: in-memory implementation, populated by GraphBuilder
///
/// Loading graphs from files belongs to the caller; the engine only reads
/// a source that is fully populated before any algorithm runs.

pub mod error;
pub mod memory_store;

use crate::types::{Edge, EdgeId, Vertex, VertexId};
pub use error::{StorageError, StorageResult};
pub use memory_store::{GraphBuilder, MemoryGraph};
use std::sync::Arc;

/// Read-only graph data source
///
/// Implementations must provide:
/// - Dense vertex ids `0..vertex_count()` and edge ids `0..edge_count()`
/// - Lookup of vertices and edges by id
/// - Per-vertex incident edge lists in a stable order
pub trait GraphSource: Send + Sync {
    /// Number of vertices
    fn vertex_count(&self) -> usize;

    /// Number of edges
    fn edge_count(&self) -> usize;

    /// Get a vertex by ID
    ///
    /// # Returns
    /// * `Ok(vertex)` if found
    /// * `Err(StorageError::VertexNotFound)` otherwise
    fn vertex(&self, id: VertexId) -> StorageResult<&Vertex>;

    /// Get an edge by ID
    ///
    /// # Returns
    /// * `Ok(edge)` if found
    /// * `Err(StorageError::EdgeNotFound)` otherwise
    fn edge(&self, id: EdgeId) -> StorageResult<&Edge>;

    /// Get the edges incident to a vertex, in load order
    fn incident_edges(&self, id: VertexId) -> StorageResult<&[EdgeId]> {
        Ok(&self.vertex(id)?.edges)
    }

    /// Check whether a vertex id is valid
    fn contains_vertex(&self, id: VertexId) -> bool {
        id.index() < self.vertex_count()
    }

    /// Iterate over all vertex ids in index order
    fn vertex_ids(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new((0..self.vertex_count()).map(VertexId::from_index))
    }
}

/// Shared graph handle
pub type SharedGraph = Arc<dyn GraphSource>;
