/// Graph traversal and spanning tree construction
///
/// A single state machine covers breadth-first, depth-first and
/// random-first search, Dijkstra's shortest paths and Prim's minimum
/// spanning tree. The variants differ only in how the discovery container
/// orders its entries and in the value a newly discovered entry carries:
///
/// | kind      | container        | value of a discovered entry     |
/// |-----------|------------------|---------------------------------|
/// | BFS       | queue            | hops from start                 |
/// | DFS       | stack            | hops from start                 |
/// | RFS       | random pick      | hops from start                 |
/// | Dijkstra  | priority (low)   | distance from start             |
/// | Prim      | priority (low)   | length of the connecting edge   |

mod actions;

pub use actions::TraversalLabel;

use super::discovery::{
    lower_value_first, ContainerStats, Discipline, DiscoveryContainer, EntryComparator, LdvEntry,
};
use super::{AlgorithmError, AlgorithmResult, Selection, StoppingCondition, TraversalDiscipline};
use crate::engine::{
    ActionState, Algorithm, Cursor, EngineResult, Machine, VisualStyle, VisualizationSink,
};
use crate::storage::GraphSource;
use crate::types::{Edge, EdgeId, TreePath, VertexId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Value carried into a newly discovered vertex, from the entry being
/// expanded and the edge it is discovered over
pub type ValueRule = fn(&LdvEntry, &Edge) -> f64;

fn hop_count(from: &LdvEntry, _edge: &Edge) -> f64 {
    from.value() + 1.0
}

fn path_length(from: &LdvEntry, edge: &Edge) -> f64 {
    from.value() + edge.length
}

fn edge_length(_from: &LdvEntry, edge: &Edge) -> f64 {
    edge.length
}

/// Traversal variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalKind {
    BreadthFirst,
    DepthFirst,
    RandomFirst,
    Dijkstra,
    Prim,
}

impl TraversalKind {
    pub fn name(&self) -> &'static str {
        match self {
            TraversalKind::BreadthFirst => "Breadth-First Search",
            TraversalKind::DepthFirst => "Depth-First Search",
            TraversalKind::RandomFirst => "Random-First Search",
            TraversalKind::Dijkstra => "Dijkstra's Algorithm",
            TraversalKind::Prim => "Prim's Algorithm",
        }
    }

    /// What the entry values measure
    pub fn value_name(&self) -> &'static str {
        match self {
            TraversalKind::BreadthFirst | TraversalKind::DepthFirst | TraversalKind::RandomFirst => {
                "hops"
            }
            TraversalKind::Dijkstra => "distance",
            TraversalKind::Prim => "edge length",
        }
    }
}

impl fmt::Display for TraversalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Container discipline and value rule of a traversal
#[derive(Clone, Copy)]
pub struct TraversalStrategy {
    pub kind: TraversalKind,
    pub discipline: Discipline,
    /// Ordering of a priority container; ignored by the other disciplines
    pub order: Option<EntryComparator>,
    pub next_value: ValueRule,
}

impl TraversalStrategy {
    pub fn bfs() -> Self {
        Self {
            kind: TraversalKind::BreadthFirst,
            discipline: Discipline::Fifo,
            order: None,
            next_value: hop_count,
        }
    }

    pub fn dfs() -> Self {
        Self {
            kind: TraversalKind::DepthFirst,
            discipline: Discipline::Lifo,
            order: None,
            next_value: hop_count,
        }
    }

    pub fn rfs() -> Self {
        Self {
            kind: TraversalKind::RandomFirst,
            discipline: Discipline::Random,
            order: None,
            next_value: hop_count,
        }
    }

    pub fn dijkstra() -> Self {
        Self {
            kind: TraversalKind::Dijkstra,
            discipline: Discipline::Priority,
            order: Some(lower_value_first),
            next_value: path_length,
        }
    }

    pub fn prim() -> Self {
        Self {
            kind: TraversalKind::Prim,
            discipline: Discipline::Priority,
            order: Some(lower_value_first),
            next_value: edge_length,
        }
    }

    pub fn for_discipline(discipline: TraversalDiscipline) -> Self {
        match discipline {
            TraversalDiscipline::Bfs => Self::bfs(),
            TraversalDiscipline::Dfs => Self::dfs(),
            TraversalDiscipline::Rfs => Self::rfs(),
        }
    }

    /// Fresh, empty container for one run
    pub fn create_container(&self, seed: Option<u64>) -> DiscoveryContainer {
        match self.discipline {
            Discipline::Lifo => DiscoveryContainer::stack(),
            Discipline::Fifo => DiscoveryContainer::queue(),
            Discipline::Random => DiscoveryContainer::random(seed),
            Discipline::Priority => {
                DiscoveryContainer::priority(self.order.unwrap_or(lower_value_first))
            }
        }
    }
}

impl fmt::Debug for TraversalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalStrategy")
            .field("kind", &self.kind)
            .field("discipline", &self.discipline)
            .finish()
    }
}

/// How a traversal ended, if it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalOutcome {
    NotStarted,
    Running,
    /// The end vertex was added to the tree
    PathFound,
    /// The container emptied under `FindReachable` or `FindAll`
    Spanned,
    /// The container emptied before the end vertex was added
    SearchFailed,
}

/// Vertices and tree edges of one connected component
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Component {
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
}

/// Per-run traversal counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraversalCounters {
    /// Distinct vertices ever put in the container
    pub discovered: u64,
    pub added: u64,
    pub discarded_on_removal: u64,
    pub discarded_on_discovery: u64,
}

/// Serializable result of a traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalReport {
    pub kind: TraversalKind,
    pub stop: StoppingCondition,
    pub start: VertexId,
    pub end: Option<VertexId>,
    pub outcome: TraversalOutcome,
    /// Entries in the order their vertices were added
    pub tree: Vec<LdvEntry>,
    pub components: Vec<Component>,
    pub path: Option<TreePath>,
    pub counters: TraversalCounters,
    pub container: Option<ContainerStats>,
}

/// Traversal state
pub struct Traversal {
    cursor: Cursor<TraversalLabel>,
    strategy: TraversalStrategy,
    /// Take the strategy from the selection's discipline at prepare time
    follow_selection: bool,
    seed: Option<u64>,

    start: VertexId,
    end: Option<VertexId>,
    stop: StoppingCondition,

    container: Option<DiscoveryContainer>,
    vertex_discovered: Vec<bool>,
    vertex_added: Vec<bool>,
    edge_discovered: Vec<bool>,

    tree: Vec<LdvEntry>,
    /// Index into `tree` of each added vertex
    tree_position: Vec<Option<usize>>,

    visiting: Option<LdvEntry>,
    /// Vertex just discovered while an earlier copy was still pending
    rediscovered: Option<VertexId>,
    neighbors: Vec<EdgeId>,
    neighbor_pos: usize,

    components: Vec<Component>,
    /// First tree index of the component being built
    component_start: usize,

    counters: TraversalCounters,
    outcome: TraversalOutcome,
    path: Option<TreePath>,
}

impl Traversal {
    pub fn new(strategy: TraversalStrategy, seed: Option<u64>) -> Self {
        Self {
            cursor: Cursor::at(TraversalLabel::Start),
            strategy,
            follow_selection: false,
            seed,
            start: VertexId::new(0),
            end: None,
            stop: StoppingCondition::default(),
            container: None,
            vertex_discovered: Vec::new(),
            vertex_added: Vec::new(),
            edge_discovered: Vec::new(),
            tree: Vec::new(),
            tree_position: Vec::new(),
            visiting: None,
            rediscovered: None,
            neighbors: Vec::new(),
            neighbor_pos: 0,
            components: Vec::new(),
            component_start: 0,
            counters: TraversalCounters::default(),
            outcome: TraversalOutcome::NotStarted,
            path: None,
        }
    }

    /// Machine running a fixed strategy
    pub fn machine(strategy: TraversalStrategy, seed: Option<u64>) -> EngineResult<Machine<Traversal>> {
        let table = actions::action_table(strategy.kind.name())?;
        Ok(Machine::new(Arc::new(table), Traversal::new(strategy, seed)))
    }

    /// Machine whose BFS, DFS or RFS strategy comes from the selection
    pub fn machine_for_selection(seed: Option<u64>) -> EngineResult<Machine<Traversal>> {
        let table = actions::action_table("Graph Traversal")?;
        let mut state = Traversal::new(TraversalStrategy::bfs(), seed);
        state.follow_selection = true;
        Ok(Machine::new(Arc::new(table), state))
    }

    pub fn strategy(&self) -> &TraversalStrategy {
        &self.strategy
    }

    pub fn outcome(&self) -> TraversalOutcome {
        self.outcome
    }

    pub fn tree(&self) -> &[LdvEntry] {
        &self.tree
    }

    /// Tree entry of an added vertex
    pub fn tree_entry(&self, vertex: VertexId) -> Option<&LdvEntry> {
        self.tree_position
            .get(vertex.index())
            .copied()
            .flatten()
            .and_then(|i| self.tree.get(i))
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn path(&self) -> Option<&TreePath> {
        self.path.as_ref()
    }

    pub fn counters(&self) -> TraversalCounters {
        self.counters
    }

    pub fn container(&self) -> Option<&DiscoveryContainer> {
        self.container.as_ref()
    }

    pub fn is_added(&self, vertex: VertexId) -> bool {
        self.vertex_added.get(vertex.index()).copied().unwrap_or(false)
    }

    pub fn is_discovered(&self, vertex: VertexId) -> bool {
        self.vertex_discovered
            .get(vertex.index())
            .copied()
            .unwrap_or(false)
    }

    pub fn is_edge_discovered(&self, edge: EdgeId) -> bool {
        self.edge_discovered.get(edge.index()).copied().unwrap_or(false)
    }

    pub fn snapshot(&self) -> TraversalReport {
        TraversalReport {
            kind: self.strategy.kind,
            stop: self.stop,
            start: self.start,
            end: self.end,
            outcome: self.outcome,
            tree: self.tree.clone(),
            components: self.components.clone(),
            path: self.path.clone(),
            counters: self.counters,
            container: self.container.as_ref().map(|c| c.stats()),
        }
    }

    fn container_ref(&self) -> AlgorithmResult<&DiscoveryContainer> {
        self.container
            .as_ref()
            .ok_or_else(|| AlgorithmError::AlgorithmFailed("traversal not started".to_string()))
    }

    fn container_mut(&mut self) -> AlgorithmResult<&mut DiscoveryContainer> {
        self.container
            .as_mut()
            .ok_or_else(|| AlgorithmError::AlgorithmFailed("traversal not started".to_string()))
    }

    fn visiting(&self) -> AlgorithmResult<LdvEntry> {
        self.visiting
            .ok_or_else(|| AlgorithmError::AlgorithmFailed("no entry being visited".to_string()))
    }

    fn container_name(&self) -> &'static str {
        self.strategy.discipline.container_name()
    }

    fn pending(&self) -> String {
        self.container
            .as_ref()
            .map_or_else(|| "empty".to_string(), |c| c.summary())
    }

    /// Style of a vertex once it is in the tree
    fn settled_style(&self, vertex: VertexId) -> VisualStyle {
        if vertex == self.start {
            VisualStyle::Start
        } else if self.end == Some(vertex) {
            VisualStyle::End
        } else {
            VisualStyle::Added
        }
    }

    fn update_panel(&self, sink: &mut dyn VisualizationSink) {
        sink.set_panel_entry("ldv", &self.pending());
        sink.set_panel_entry(
            "counts",
            &format!(
                "discovered {}, added {}, discarded {} on removal and {} on discovery",
                self.counters.discovered,
                self.counters.added,
                self.counters.discarded_on_removal,
                self.counters.discarded_on_discovery
            ),
        );
    }

    /// Follow from-vertex links back from the end vertex to the start
    fn reconstruct_path(&self) -> AlgorithmResult<TreePath> {
        let end = self
            .end
            .ok_or_else(|| AlgorithmError::AlgorithmFailed("no end vertex".to_string()))?;
        let last = *self.tree_entry(end).ok_or_else(|| {
            AlgorithmError::AlgorithmFailed(format!("{} was never added", end))
        })?;

        let mut vertices = vec![end];
        let mut edges = Vec::new();
        let mut entry = last;
        while let (Some(from), Some(edge)) = (entry.from_vertex(), entry.via_edge()) {
            if edges.len() >= self.tree.len() {
                return Err(AlgorithmError::AlgorithmFailed(
                    "cycle in traversal tree".to_string(),
                ));
            }
            edges.push(edge);
            vertices.push(from);
            entry = *self.tree_entry(from).ok_or_else(|| {
                AlgorithmError::AlgorithmFailed(format!("{} was never added", from))
            })?;
        }
        vertices.reverse();
        edges.reverse();

        TreePath::from_parts(vertices, edges, last.value())
            .map_err(|e| AlgorithmError::AlgorithmFailed(e.to_string()))
    }
}

impl ActionState for Traversal {
    type Label = TraversalLabel;

    fn cursor(&self) -> &Cursor<TraversalLabel> {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor<TraversalLabel> {
        &mut self.cursor
    }
}

impl Algorithm for Traversal {
    fn prepare(&mut self, graph: &dyn GraphSource, selection: &Selection) -> AlgorithmResult<()> {
        if graph.vertex_count() == 0 {
            return Err(AlgorithmError::InvalidParameters(
                "graph has no vertices".to_string(),
            ));
        }
        if self.follow_selection {
            self.strategy = TraversalStrategy::for_discipline(selection.discipline);
        }

        let start = selection.start.unwrap_or_else(|| VertexId::new(0));
        if !graph.contains_vertex(start) {
            return Err(AlgorithmError::InvalidParameters(format!(
                "start vertex {} not in graph",
                start
            )));
        }

        self.end = match selection.stop {
            StoppingCondition::StopAtEnd => {
                let end = selection.end.ok_or_else(|| {
                    AlgorithmError::InvalidParameters(
                        "stopping at the end vertex requires an end vertex".to_string(),
                    )
                })?;
                if !graph.contains_vertex(end) {
                    return Err(AlgorithmError::InvalidParameters(format!(
                        "end vertex {} not in graph",
                        end
                    )));
                }
                Some(end)
            }
            _ => None,
        };

        self.start = start;
        self.stop = selection.stop;
        self.outcome = TraversalOutcome::NotStarted;
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}
