/// Discovery container (list of discovered vertices)
///
/// One container type covers the four removal disciplines graph searches
/// need: stack (DFS), queue (BFS), uniform random pick (RFS), and priority
/// queue (Dijkstra, Prim). The traversal state machine only ever calls
/// `add`/`remove`/`is_empty`, so switching BFS to DFS is a matter of
/// constructing a different container.

use super::{AlgorithmError, AlgorithmResult};
use crate::types::{Edge, EdgeId, VertexId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

/// Entry in a discovery container
///
/// `from_vertex` is present exactly when `via_edge` is: only the entry
/// seeding a search has neither.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LdvEntry {
    vertex: VertexId,
    value: f64,
    via_edge: Option<EdgeId>,
    from_vertex: Option<VertexId>,
}

impl LdvEntry {
    /// Entry seeding a search at `vertex`
    pub fn seed(vertex: VertexId, value: f64) -> Self {
        Self {
            vertex,
            value,
            via_edge: None,
            from_vertex: None,
        }
    }

    /// Entry reaching `vertex` over `edge`
    ///
    /// The from-vertex is the endpoint of `edge` that is not `vertex`.
    pub fn via(vertex: VertexId, value: f64, edge: &Edge) -> Self {
        debug_assert!(edge.connects(vertex), "{} is not an endpoint of {}", vertex, edge.id);
        let from = if edge.v1 == vertex { edge.v2 } else { edge.v1 };
        Self {
            vertex,
            value,
            via_edge: Some(edge.id),
            from_vertex: Some(from),
        }
    }

    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn via_edge(&self) -> Option<EdgeId> {
        self.via_edge
    }

    pub fn from_vertex(&self) -> Option<VertexId> {
        self.from_vertex
    }
}

impl fmt::Display for LdvEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from_vertex, self.via_edge) {
            (Some(from), Some(edge)) => {
                write!(f, "{} ({}) via {} from {}", self.vertex, self.value, edge, from)
            }
            _ => write!(f, "{} ({})", self.vertex, self.value),
        }
    }
}

/// Attribute of an entry to match against, carrying the value to match
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LdvField {
    Vertex(VertexId),
    ViaEdge(EdgeId),
    FromVertex(VertexId),
    Value(f64),
}

impl LdvField {
    fn matches(&self, entry: &LdvEntry) -> bool {
        match *self {
            LdvField::Vertex(v) => entry.vertex == v,
            LdvField::ViaEdge(e) => entry.via_edge == Some(e),
            LdvField::FromVertex(v) => entry.from_vertex == Some(v),
            LdvField::Value(x) => entry.value == x,
        }
    }
}

/// Removal discipline of a discovery container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    /// Stack: remove the most recently added entry
    Lifo,
    /// Queue: remove the earliest added entry
    Fifo,
    /// Remove a uniformly chosen entry
    Random,
    /// Remove the extremal entry under a comparator
    Priority,
}

impl Discipline {
    /// Display name used in status panels
    pub fn container_name(&self) -> &'static str {
        match self {
            Discipline::Lifo => "Stack",
            Discipline::Fifo => "Queue",
            Discipline::Random => "List",
            Discipline::Priority => "PQueue",
        }
    }
}

/// Total order over entries; `Less` means "leaves the container first"
pub type EntryComparator = fn(&LdvEntry, &LdvEntry) -> Ordering;

/// Comparator putting lower values first
pub fn lower_value_first(a: &LdvEntry, b: &LdvEntry) -> Ordering {
    a.value.total_cmp(&b.value)
}

/// Comparator putting higher values first
pub fn higher_value_first(a: &LdvEntry, b: &LdvEntry) -> Ordering {
    b.value.total_cmp(&a.value)
}

/// Diagnostic counters of a container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStats {
    pub added: u64,
    pub removed: u64,
    pub peak_len: usize,
}

/// Discovery container
///
/// For `Priority`, the sequence is kept sorted by the comparator so the
/// front is always the next entry to leave. A new entry is inserted before
/// the first held entry (scanning from the front) that it strictly
/// precedes, so entries that compare equal leave in insertion order.
pub struct DiscoveryContainer {
    discipline: Discipline,
    order: Option<EntryComparator>,
    entries: VecDeque<LdvEntry>,
    rng: StdRng,
    stats: ContainerStats,
}

impl DiscoveryContainer {
    /// Stack container (LIFO)
    pub fn stack() -> Self {
        Self::with_discipline(Discipline::Lifo, None, StdRng::from_entropy())
    }

    /// Queue container (FIFO)
    pub fn queue() -> Self {
        Self::with_discipline(Discipline::Fifo, None, StdRng::from_entropy())
    }

    /// Random-pick container
    ///
    /// With a seed, the removal sequence is reproducible.
    pub fn random(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_discipline(Discipline::Random, None, rng)
    }

    /// Priority container ordered by `order`
    pub fn priority(order: EntryComparator) -> Self {
        Self::with_discipline(Discipline::Priority, Some(order), StdRng::from_entropy())
    }

    fn with_discipline(discipline: Discipline, order: Option<EntryComparator>, rng: StdRng) -> Self {
        Self {
            discipline,
            order,
            entries: VecDeque::new(),
            rng,
            stats: ContainerStats::default(),
        }
    }

    /// Add an entry according to the discipline
    pub fn add(&mut self, entry: LdvEntry) {
        match self.order {
            Some(order) => {
                let pos = self
                    .entries
                    .iter()
                    .position(|held| order(&entry, held) == Ordering::Less)
                    .unwrap_or(self.entries.len());
                self.entries.insert(pos, entry);
            }
            None => self.entries.push_back(entry),
        }

        self.stats.added += 1;
        self.stats.peak_len = self.stats.peak_len.max(self.entries.len());
    }

    /// Remove the next entry according to the discipline
    ///
    /// # Errors
    /// Returns `AlgorithmError::EmptyContainer` if nothing is held; callers
    /// are expected to check `is_empty()` first.
    pub fn remove(&mut self) -> AlgorithmResult<LdvEntry> {
        let entry = match self.discipline {
            Discipline::Lifo => self.entries.pop_back(),
            Discipline::Fifo | Discipline::Priority => self.entries.pop_front(),
            Discipline::Random => {
                if self.entries.is_empty() {
                    None
                } else {
                    let index = self.rng.gen_range(0..self.entries.len());
                    self.entries.remove(index)
                }
            }
        }
        .ok_or(AlgorithmError::EmptyContainer(self.discipline))?;

        self.stats.removed += 1;
        Ok(entry)
    }

    /// Check whether no entries are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether any held entry matches `field`
    ///
    /// Used to show whether a vertex is already pending; traversal
    /// correctness never depends on it.
    pub fn contains_field_matching(&self, field: LdvField) -> bool {
        self.entries.iter().any(|entry| field.matches(entry))
    }

    /// Held entries in storage order
    ///
    /// For `Priority` this is removal order; for `Fifo` and `Random` it is
    /// insertion order; for `Lifo` the last entry leaves first.
    pub fn iter(&self) -> impl Iterator<Item = &LdvEntry> {
        self.entries.iter()
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn stats(&self) -> ContainerStats {
        self.stats
    }

    /// One-line summary for status panels, e.g. `Queue (3): v1 (1), v4 (1)`
    pub fn summary(&self) -> String {
        let items: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{} ({})", e.vertex, e.value))
            .collect();
        format!(
            "{} ({}): {}",
            self.discipline.container_name(),
            self.entries.len(),
            items.join(", ")
        )
    }
}

impl fmt::Debug for DiscoveryContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryContainer")
            .field("discipline", &self.discipline)
            .field("entries", &self.entries)
            .field("stats", &self.stats)
            .finish()
    }
}
