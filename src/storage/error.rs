/// Error types for graph data source operations

use crate::types::{EdgeId, VertexId};
use thiserror::Error;

/// Graph data source errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Vertex not found
    #[error("Vertex not found: {0}")]
    VertexNotFound(VertexId),

    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Edge endpoint does not exist
    #[error("Cannot add edge {label:?}: endpoint {endpoint} does not exist")]
    InvalidEndpoint { label: String, endpoint: VertexId },

    /// Edge length is negative or not a number
    #[error("Cannot add edge {label:?}: invalid length {length}")]
    InvalidLength { label: String, length: f64 },

    /// Graph grew past the id space
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
}

/// Result type for graph data source operations
pub type StorageResult<T> = Result<T, StorageError>;
