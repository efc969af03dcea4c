/// Vertex extremes search
///
/// Brute-force pass over every vertex that keeps a leader for each
/// direction: northernmost, southernmost, easternmost and westernmost
/// coordinates, and the shortest and longest labels. Ties keep the vertex
/// seen first.

use super::{AlgorithmError, AlgorithmResult, Selection};
use crate::engine::{
    Action, ActionContext, ActionState, ActionTable, Algorithm, Cursor, EngineResult, Machine,
    Next, VisualStyle, VisualizationSink,
};
use crate::storage::GraphSource;
use crate::types::{Vertex, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A criterion a leader is kept for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    ShortestLabel,
    LongestLabel,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::ShortestLabel,
        Direction::LongestLabel,
    ];

    /// Whether `candidate` strictly beats `leader`
    pub fn beats(&self, candidate: &Vertex, leader: &Vertex) -> bool {
        match self {
            Direction::North => candidate.lat > leader.lat,
            Direction::South => candidate.lat < leader.lat,
            Direction::East => candidate.lng > leader.lng,
            Direction::West => candidate.lng < leader.lng,
            Direction::ShortestLabel => candidate.label.len() < leader.label.len(),
            Direction::LongestLabel => candidate.label.len() > leader.label.len(),
        }
    }

    fn position(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
            Direction::ShortestLabel => 4,
            Direction::LongestLabel => 5,
        }
    }

    fn following(&self) -> Option<Direction> {
        Direction::ALL.get(self.position() + 1).copied()
    }

    fn check_code(&self) -> &'static str {
        match self {
            Direction::North => "ext_check_north",
            Direction::South => "ext_check_south",
            Direction::East => "ext_check_east",
            Direction::West => "ext_check_west",
            Direction::ShortestLabel => "ext_check_shortest",
            Direction::LongestLabel => "ext_check_longest",
        }
    }

    fn update_code(&self) -> &'static str {
        match self {
            Direction::North => "ext_update_north",
            Direction::South => "ext_update_south",
            Direction::East => "ext_update_east",
            Direction::West => "ext_update_west",
            Direction::ShortestLabel => "ext_update_shortest",
            Direction::LongestLabel => "ext_update_longest",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::ShortestLabel => "shortest",
            Direction::LongestLabel => "longest",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtremesLabel {
    Start,
    TopLoop,
    Check(Direction),
    Update(Direction),
    LoopIncrement,
    Cleanup,
}

impl fmt::Display for ExtremesLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtremesLabel::Start => f.write_str("START"),
            ExtremesLabel::TopLoop => f.write_str("topLoop"),
            ExtremesLabel::Check(d) => write!(f, "check_{}", d),
            ExtremesLabel::Update(d) => write!(f, "update_{}", d),
            ExtremesLabel::LoopIncrement => f.write_str("loopIncrement"),
            ExtremesLabel::Cleanup => f.write_str("cleanup"),
        }
    }
}

/// Leaders found by a vertex extremes search
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtremesReport {
    pub leaders: BTreeMap<Direction, VertexId>,
    /// Vertices compared so far, the first one included
    pub checked: usize,
    pub complete: bool,
}

/// Vertex extremes search state
pub struct VertexExtremes {
    cursor: Cursor<ExtremesLabel>,
    vertex_count: usize,
    /// Vertex under comparison
    current: usize,
    leaders: [VertexId; 6],
    /// Direction handled by the last check or update
    last_direction: Direction,
    last_improved: bool,
    complete: bool,
}

impl VertexExtremes {
    pub fn new() -> Self {
        Self {
            cursor: Cursor::at(ExtremesLabel::Start),
            vertex_count: 0,
            current: 0,
            leaders: [VertexId::new(0); 6],
            last_direction: Direction::North,
            last_improved: false,
            complete: false,
        }
    }

    pub fn machine() -> EngineResult<Machine<VertexExtremes>> {
        Ok(Machine::new(Arc::new(action_table()?), VertexExtremes::new()))
    }

    pub fn leader(&self, direction: Direction) -> VertexId {
        self.leaders[direction.position()]
    }

    pub fn snapshot(&self) -> ExtremesReport {
        let checked = if self.vertex_count == 0 {
            0
        } else {
            self.current.min(self.vertex_count)
        };
        ExtremesReport {
            leaders: Direction::ALL
                .iter()
                .map(|&d| (d, self.leader(d)))
                .collect(),
            checked,
            complete: self.complete,
        }
    }

    fn current_vertex(&self) -> VertexId {
        VertexId::from_index(self.current)
    }

    fn is_leader(&self, vertex: VertexId) -> bool {
        self.leaders.contains(&vertex)
    }

    fn update_panel(&self, sink: &mut dyn VisualizationSink) {
        for d in Direction::ALL {
            sink.set_panel_entry(&format!("leader:{}", d), &self.leader(d).to_string());
        }
    }
}

impl Default for VertexExtremes {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionState for VertexExtremes {
    type Label = ExtremesLabel;

    fn cursor(&self) -> &Cursor<ExtremesLabel> {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut Cursor<ExtremesLabel> {
        &mut self.cursor
    }
}

impl Algorithm for VertexExtremes {
    fn prepare(&mut self, graph: &dyn GraphSource, _selection: &Selection) -> AlgorithmResult<()> {
        if graph.vertex_count() == 0 {
            return Err(AlgorithmError::InvalidParameters(
                "graph has no vertices".to_string(),
            ));
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

use ExtremesLabel as L;

fn action_table() -> EngineResult<ActionTable<VertexExtremes>> {
    let mut actions = vec![
        Action::new(L::Start, "ext_start", start, |t| {
            format!("{} is the initial leader in every direction", t.leader(Direction::North))
        })
        .leads_to([L::TopLoop]),
        Action::new(L::TopLoop, "ext_top_loop", top_loop, |t| {
            if t.current < t.vertex_count {
                format!("Checking {}", t.current_vertex())
            } else {
                "All vertices checked".to_string()
            }
        })
        .leads_to([L::Check(Direction::North), L::Cleanup]),
    ];

    for d in Direction::ALL {
        actions.push(
            Action::new(L::Check(d), d.check_code(), check, |t| {
                if t.last_improved {
                    format!("{} beats the {} leader", t.current_vertex(), t.last_direction)
                } else {
                    format!(
                        "{} does not beat the {} leader {}",
                        t.current_vertex(),
                        t.last_direction,
                        t.leader(t.last_direction)
                    )
                }
            })
            .leads_to([L::Update(d), after(d)]),
        );
        actions.push(
            Action::new(L::Update(d), d.update_code(), update, |t| {
                format!("{} is the new {} leader", t.current_vertex(), t.last_direction)
            })
            .leads_to([after(d)]),
        );
    }

    actions.push(
        Action::new(L::LoopIncrement, "ext_loop_increment", loop_increment, |t| {
            format!("Next vertex {}", t.current)
        })
        .leads_to([L::TopLoop]),
    );
    actions.push(
        Action::new(L::Cleanup, "ext_cleanup", cleanup, |t| {
            let leaders: Vec<String> = Direction::ALL
                .iter()
                .map(|&d| format!("{} {}", d, t.leader(d)))
                .collect();
            format!("Done: {}", leaders.join(", "))
        })
        .may_finish(),
    );

    ActionTable::new("Vertex Extremes Search", L::Start, actions)
}

/// Direction of the check or update action under the cursor
fn active_direction(t: &VertexExtremes) -> AlgorithmResult<Direction> {
    match t.cursor.next {
        Next::Action(L::Check(d)) | Next::Action(L::Update(d)) => Ok(d),
        other => Err(AlgorithmError::AlgorithmFailed(format!(
            "{} is not a check or update",
            other
        ))),
    }
}

fn after(direction: Direction) -> ExtremesLabel {
    direction.following().map_or(L::LoopIncrement, L::Check)
}

fn start(t: &mut VertexExtremes, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let graph = ctx.graph;
    t.vertex_count = graph.vertex_count();
    t.leaders = [VertexId::new(0); 6];
    t.current = 1;
    t.last_improved = false;
    t.complete = false;

    for v in graph.vertex_ids() {
        ctx.sink.mark_vertex(v, VisualStyle::Unvisited, 0, false);
    }
    ctx.sink
        .mark_vertex(VertexId::new(0), VisualStyle::Leader, 5, false);
    t.update_panel(ctx.sink);

    t.cursor.goto(L::TopLoop);
    Ok(())
}

fn top_loop(t: &mut VertexExtremes, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    if t.current < t.vertex_count {
        ctx.sink
            .mark_vertex(t.current_vertex(), VisualStyle::Visiting, 8, false);
        t.cursor.goto(L::Check(Direction::North));
    } else {
        t.cursor.goto(L::Cleanup);
    }
    Ok(())
}

fn check(t: &mut VertexExtremes, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let direction = active_direction(t)?;
    let candidate = ctx.graph.vertex(t.current_vertex())?;
    let leader = ctx.graph.vertex(t.leader(direction))?;

    t.last_direction = direction;
    t.last_improved = direction.beats(candidate, leader);
    if t.last_improved {
        t.cursor.goto(L::Update(direction));
    } else {
        t.cursor.goto(after(direction));
    }
    Ok(())
}

fn update(t: &mut VertexExtremes, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let direction = active_direction(t)?;
    let previous = t.leader(direction);
    t.leaders[direction.position()] = t.current_vertex();
    t.last_direction = direction;

    if !t.is_leader(previous) {
        ctx.sink
            .mark_vertex(previous, VisualStyle::Unvisited, 0, false);
    }
    t.update_panel(ctx.sink);

    t.cursor.goto(after(direction));
    Ok(())
}

fn loop_increment(t: &mut VertexExtremes, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let vertex = t.current_vertex();
    if t.is_leader(vertex) {
        ctx.sink.mark_vertex(vertex, VisualStyle::Leader, 5, false);
    } else {
        ctx.sink
            .mark_vertex(vertex, VisualStyle::DiscardedOnRemoval, 1, false);
    }

    t.current += 1;
    t.cursor.end_iteration();
    t.cursor.goto(L::TopLoop);
    Ok(())
}

fn cleanup(t: &mut VertexExtremes, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    t.complete = true;
    t.update_panel(ctx.sink);
    t.cursor.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RecordingSink, SteppedAlgorithm};
    use crate::storage::{GraphBuilder, MemoryGraph};

    fn places() -> MemoryGraph {
        let mut b = GraphBuilder::new();
        b.add_vertex("Albany", 42.65, -73.75).unwrap();
        b.add_vertex("Troy", 42.73, -73.69).unwrap();
        b.add_vertex("Schenectady", 42.81, -73.94).unwrap();
        b.add_vertex("Hudson", 42.25, -73.79).unwrap();
        b.add_vertex("Rye", 40.98, -73.68).unwrap();
        b.build()
    }

    fn run(graph: &MemoryGraph) -> (Machine<VertexExtremes>, RecordingSink, u64) {
        let mut machine = VertexExtremes::machine().unwrap();
        let mut sink = RecordingSink::new();
        machine.prepare(graph, &Selection::default()).unwrap();
        let mut ctx = ActionContext {
            graph,
            sink: &mut sink,
        };
        let mut iterations = 0;
        while !machine.is_done() {
            if machine.perform(&mut ctx).unwrap().iteration_done {
                iterations += 1;
            }
        }
        (machine, sink, iterations)
    }

    #[test]
    fn test_finds_leaders() {
        let graph = places();
        let (machine, sink, _) = run(&graph);
        let state = machine.state();

        assert_eq!(state.leader(Direction::North), VertexId::new(2));
        assert_eq!(state.leader(Direction::South), VertexId::new(4));
        assert_eq!(state.leader(Direction::East), VertexId::new(4));
        assert_eq!(state.leader(Direction::West), VertexId::new(2));
        assert_eq!(state.leader(Direction::ShortestLabel), VertexId::new(4));
        assert_eq!(state.leader(Direction::LongestLabel), VertexId::new(2));

        assert_eq!(sink.panel()["leader:south"], "v4");
        assert_eq!(sink.vertex_styles()[&VertexId::new(4)], VisualStyle::Leader);
    }

    #[test]
    fn test_one_iteration_per_compared_vertex() {
        let graph = places();
        let (machine, _, iterations) = run(&graph);
        assert_eq!(iterations, 4);

        let report: ExtremesReport = serde_json::from_value(machine.report()).unwrap();
        assert!(report.complete);
        assert_eq!(report.checked, 5);
        assert_eq!(report.leaders.len(), 6);
    }

    #[test]
    fn test_single_vertex_graph() {
        let mut b = GraphBuilder::new();
        b.add_vertex("Only", 1.0, 1.0).unwrap();
        let graph = b.build();
        let (machine, _, iterations) = run(&graph);

        assert_eq!(iterations, 0);
        for d in Direction::ALL {
            assert_eq!(machine.state().leader(d), VertexId::new(0));
        }
    }

    #[test]
    fn test_ties_keep_first() {
        let mut b = GraphBuilder::new();
        for _ in 0..3 {
            b.add_vertex("Same", 5.0, 5.0).unwrap();
        }
        let graph = b.build();
        let (machine, _, _) = run(&graph);
        for d in Direction::ALL {
            assert_eq!(machine.state().leader(d), VertexId::new(0));
        }
    }

    #[test]
    fn test_empty_graph_rejected() {
        let mut machine = VertexExtremes::machine().unwrap();
        let graph = MemoryGraph::default();
        assert!(machine.prepare(&graph, &Selection::default()).is_err());
    }

    #[test]
    fn test_label_names() {
        assert_eq!(ExtremesLabel::Check(Direction::East).to_string(), "check_east");
        assert_eq!(ExtremesLabel::Start.to_string(), "START");
        let machine = VertexExtremes::machine().unwrap();
        assert_eq!(machine.action_names().len(), 4 + 2 * Direction::ALL.len());
    }
}
