use serde::{Deserialize, Serialize};
use std::fmt;

/// VertexId: dense index of a vertex in a loaded graph
///
/// Vertices are numbered `0..vertex_count` in load order. The dense
/// numbering lets traversals keep per-vertex state in plain vectors and
/// lets "lowest-indexed unvisited vertex" scans run in index order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(u32);

/// EdgeId: dense index of an edge in a loaded graph
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

macro_rules! dense_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Create an id from its raw index
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the raw index
            pub const fn as_raw(&self) -> u32 {
                self.0
            }

            /// Get the index as a `usize`, for indexing per-item vectors
            pub const fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $ty {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$ty> for u32 {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

dense_id!(VertexId, "v");
dense_id!(EdgeId, "e");

impl VertexId {
    /// Convert a vector position back into an id
    ///
    /// Positions come from vectors the graph builder caps at `u32::MAX`
    /// entries.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl EdgeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}
