/// Core data types for the stepping engine
///
/// This module contains the fundamental graph types:
/// - VertexId / EdgeId: dense identifiers
/// - Vertex: waypoint with coordinates and incident edges
/// - Edge: undirected road segment with a length
/// - TreePath: path recovered from a traversal's spanning tree

pub mod edge;
pub mod ids;
pub mod path;
pub mod vertex;

pub use edge::Edge;
pub use ids::{EdgeId, VertexId};
pub use path::{PathError, TreePath};
pub use vertex::Vertex;
