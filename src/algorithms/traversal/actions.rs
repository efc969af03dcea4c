/// Action table of the traversal state machine
///
/// One iteration removes one entry from the discovery container. It ends
/// either by discarding the entry (its vertex was already added) or after
/// all the newly added vertex's neighbors have been looked at.

use super::{Component, Traversal, TraversalOutcome};
use crate::algorithms::discovery::{LdvEntry, LdvField};
use crate::algorithms::{AlgorithmError, AlgorithmResult, StoppingCondition};
use crate::engine::{Action, ActionContext, ActionTable, EngineResult, VisualStyle};
use crate::types::{Edge, EdgeId, VertexId};
use std::fmt;

const Z_UNVISITED: i32 = 0;
const Z_ADDED: i32 = 4;
const Z_DISCOVERED: i32 = 5;
const Z_VISITING: i32 = 8;
const Z_ENDPOINT: i32 = 10;

/// Labels of the traversal actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalLabel {
    Start,
    TopLoop,
    RemoveEntry,
    CheckAdded,
    DiscardOnRemoval,
    AddVertex,
    NeighborLoopTop,
    CheckNeighbor,
    DiscardOnDiscovery,
    DiscoverNeighbor,
    NeighborLoopNext,
    FinishComponent,
    SeedNextComponent,
    Cleanup,
}

impl fmt::Display for TraversalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraversalLabel::Start => "START",
            TraversalLabel::TopLoop => "topLoop",
            TraversalLabel::RemoveEntry => "removeEntry",
            TraversalLabel::CheckAdded => "checkAdded",
            TraversalLabel::DiscardOnRemoval => "discardOnRemoval",
            TraversalLabel::AddVertex => "addVertex",
            TraversalLabel::NeighborLoopTop => "neighborLoopTop",
            TraversalLabel::CheckNeighbor => "checkNeighbor",
            TraversalLabel::DiscardOnDiscovery => "discardOnDiscovery",
            TraversalLabel::DiscoverNeighbor => "discoverNeighbor",
            TraversalLabel::NeighborLoopNext => "neighborLoopNext",
            TraversalLabel::FinishComponent => "finishComponent",
            TraversalLabel::SeedNextComponent => "seedNextComponent",
            TraversalLabel::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

use TraversalLabel as L;

/// Build the traversal action table under `name`
pub(super) fn action_table(name: &str) -> EngineResult<ActionTable<Traversal>> {
    ActionTable::new(
        name,
        L::Start,
        vec![
            Action::new(L::Start, "trav_start", start, |t| {
                format!("Started at {} using a {}", t.start, t.container_name())
            })
            .leads_to([L::TopLoop]),
            Action::new(L::TopLoop, "trav_top_loop", top_loop, |t| match t.outcome {
                TraversalOutcome::Running => format!("{} not empty, continuing", t.container_name()),
                outcome => format!("Loop finished: {:?}", outcome),
            })
            .leads_to([L::RemoveEntry, L::FinishComponent, L::Cleanup]),
            Action::new(L::RemoveEntry, "trav_remove", remove_entry, |t| {
                format!("Removed {} from {}", describe_visiting(t), t.container_name())
            })
            .leads_to([L::CheckAdded]),
            Action::new(L::CheckAdded, "trav_check_added", check_added, |t| {
                format!("Checking whether {} was already added", describe_visiting(t))
            })
            .leads_to([L::DiscardOnRemoval, L::AddVertex]),
            Action::new(L::DiscardOnRemoval, "trav_discard_removal", discard_on_removal, |t| {
                format!(
                    "Discarded on removal ({} so far)",
                    t.counters.discarded_on_removal
                )
            })
            .leads_to([L::TopLoop]),
            Action::new(L::AddVertex, "trav_add", add_vertex, |t| {
                format!(
                    "Added {} to the tree ({} vertices)",
                    t.tree.last().map_or_else(String::new, |e| e.to_string()),
                    t.tree.len()
                )
            })
            .leads_to([L::NeighborLoopTop, L::TopLoop]),
            Action::new(L::NeighborLoopTop, "trav_neighbor_loop", neighbor_loop_top, |t| {
                match t.neighbors.get(t.neighbor_pos) {
                    Some(edge) => format!("Looking at neighbor over {}", edge),
                    None => "No more neighbors".to_string(),
                }
            })
            .leads_to([L::CheckNeighbor, L::TopLoop]),
            Action::new(L::CheckNeighbor, "trav_check_neighbor", check_neighbor, |t| {
                format!("Checking neighbor {} of {}", t.neighbor_pos, describe_visiting(t))
            })
            .leads_to([L::DiscardOnDiscovery, L::DiscoverNeighbor]),
            Action::new(
                L::DiscardOnDiscovery,
                "trav_discard_discovery",
                discard_on_discovery,
                |t| {
                    format!(
                        "Discarded on discovery ({} so far)",
                        t.counters.discarded_on_discovery
                    )
                },
            )
            .leads_to([L::NeighborLoopNext]),
            Action::new(L::DiscoverNeighbor, "trav_discover", discover_neighbor, |t| {
                match t.rediscovered {
                    Some(vertex) => format!(
                        "Discovered {} again while already pending: {}",
                        vertex,
                        t.pending()
                    ),
                    None => format!("Discovered a neighbor: {}", t.pending()),
                }
            })
            .leads_to([L::NeighborLoopNext]),
            Action::new(L::NeighborLoopNext, "trav_neighbor_next", neighbor_loop_next, |_| {
                "Next neighbor".to_string()
            })
            .leads_to([L::NeighborLoopTop]),
            Action::new(L::FinishComponent, "trav_finish_component", finish_component, |t| {
                match t.components.last() {
                    Some(c) => format!(
                        "Component {} complete: {} vertices, {} edges",
                        t.components.len(),
                        c.vertices.len(),
                        c.edges.len()
                    ),
                    None => "Component complete".to_string(),
                }
            })
            .leads_to([L::SeedNextComponent]),
            Action::new(L::SeedNextComponent, "trav_seed_component", seed_next_component, |t| {
                match t.outcome {
                    TraversalOutcome::Running => format!(
                        "Starting component {}: {}",
                        t.components.len() + 1,
                        t.pending()
                    ),
                    _ => "Every vertex is in a component".to_string(),
                }
            })
            .leads_to([L::TopLoop, L::Cleanup]),
            Action::new(L::Cleanup, "trav_cleanup", cleanup, describe_outcome).may_finish(),
        ],
    )
}

fn describe_visiting(t: &Traversal) -> String {
    t.visiting.map_or_else(|| "nothing".to_string(), |e| e.to_string())
}

fn describe_outcome(t: &Traversal) -> String {
    match t.outcome {
        TraversalOutcome::PathFound => match &t.path {
            Some(path) => format!(
                "Found path from {} to {}: {} edges, {} {}",
                t.start,
                path.end().unwrap_or(t.start),
                path.len(),
                t.strategy.kind.value_name(),
                path.value
            ),
            None => "Found path".to_string(),
        },
        TraversalOutcome::SearchFailed => format!(
            "Search failed: {} is not reachable from {}",
            t.end.map_or_else(String::new, |v| v.to_string()),
            t.start
        ),
        TraversalOutcome::Spanned => match t.stop {
            StoppingCondition::FindAll => format!(
                "Found {} components spanning {} vertices",
                t.components.len(),
                t.tree.len()
            ),
            _ => format!("Spanned {} vertices reachable from {}", t.tree.len(), t.start),
        },
        outcome => format!("Stopped: {:?}", outcome),
    }
}

fn start(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let graph = ctx.graph;
    let vertices = graph.vertex_count();
    let edges = graph.edge_count();

    t.vertex_discovered = vec![false; vertices];
    t.vertex_added = vec![false; vertices];
    t.edge_discovered = vec![false; edges];
    t.tree.clear();
    t.tree_position = vec![None; vertices];
    t.visiting = None;
    t.rediscovered = None;
    t.neighbors.clear();
    t.neighbor_pos = 0;
    t.components.clear();
    t.component_start = 0;
    t.counters = Default::default();
    t.path = None;
    t.outcome = TraversalOutcome::Running;

    for v in graph.vertex_ids() {
        ctx.sink.mark_vertex(v, VisualStyle::Unvisited, Z_UNVISITED, false);
    }
    for e in 0..edges {
        ctx.sink
            .mark_edge(EdgeId::from_index(e), VisualStyle::Unvisited, false);
    }

    let mut container = t.strategy.create_container(t.seed);
    container.add(LdvEntry::seed(t.start, 0.0));
    t.container = Some(container);
    t.vertex_discovered[t.start.index()] = true;
    t.counters.discovered += 1;

    ctx.sink
        .mark_vertex(t.start, VisualStyle::Start, Z_ENDPOINT, false);
    if let Some(end) = t.end {
        ctx.sink.mark_vertex(end, VisualStyle::End, Z_ENDPOINT, false);
    }
    t.update_panel(ctx.sink);

    t.cursor.goto(L::TopLoop);
    Ok(())
}

fn top_loop(t: &mut Traversal, _ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let empty = t.container_ref()?.is_empty();

    match t.stop {
        StoppingCondition::StopAtEnd => {
            let reached = t.end.map_or(false, |end| t.vertex_added[end.index()]);
            if reached {
                t.outcome = TraversalOutcome::PathFound;
                t.cursor.goto(L::Cleanup);
            } else if empty {
                t.outcome = TraversalOutcome::SearchFailed;
                t.cursor.goto(L::Cleanup);
            } else {
                t.cursor.goto(L::RemoveEntry);
            }
        }
        StoppingCondition::FindReachable => {
            if empty {
                t.outcome = TraversalOutcome::Spanned;
                t.cursor.goto(L::Cleanup);
            } else {
                t.cursor.goto(L::RemoveEntry);
            }
        }
        StoppingCondition::FindAll => {
            if empty {
                t.cursor.goto(L::FinishComponent);
            } else {
                t.cursor.goto(L::RemoveEntry);
            }
        }
    }
    Ok(())
}

fn remove_entry(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let entry = t.container_mut()?.remove()?;
    t.visiting = Some(entry);

    ctx.sink
        .mark_vertex(entry.vertex(), VisualStyle::Visiting, Z_VISITING, false);
    if let Some(edge) = entry.via_edge() {
        ctx.sink.mark_edge(edge, VisualStyle::Visiting, false);
    }
    t.update_panel(ctx.sink);

    t.cursor.goto(L::CheckAdded);
    Ok(())
}

fn check_added(t: &mut Traversal, _ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let vertex = t.visiting()?.vertex();
    if t.vertex_added[vertex.index()] {
        t.cursor.goto(L::DiscardOnRemoval);
    } else {
        t.cursor.goto(L::AddVertex);
    }
    Ok(())
}

fn discard_on_removal(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let entry = t.visiting()?;
    t.counters.discarded_on_removal += 1;

    if let Some(edge) = entry.via_edge() {
        ctx.sink
            .mark_edge(edge, VisualStyle::DiscardedOnRemoval, false);
    }
    let style = t.settled_style(entry.vertex());
    ctx.sink.mark_vertex(entry.vertex(), style, Z_ADDED, false);
    t.update_panel(ctx.sink);

    t.visiting = None;
    t.cursor.end_iteration();
    t.cursor.goto(L::TopLoop);
    Ok(())
}

fn add_vertex(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let entry = t.visiting()?;
    let vertex = entry.vertex();

    t.vertex_added[vertex.index()] = true;
    t.tree_position[vertex.index()] = Some(t.tree.len());
    t.tree.push(entry);
    t.counters.added += 1;

    let style = t.settled_style(vertex);
    ctx.sink.mark_vertex(vertex, style, Z_ADDED, false);
    if let Some(edge) = entry.via_edge() {
        ctx.sink.mark_edge(edge, VisualStyle::Added, false);
    }
    t.update_panel(ctx.sink);

    if t.stop == StoppingCondition::StopAtEnd && t.end == Some(vertex) {
        t.visiting = None;
        t.cursor.end_iteration();
        t.cursor.goto(L::TopLoop);
        return Ok(());
    }

    t.neighbors = ctx
        .graph
        .incident_edges(vertex)?
        .iter()
        .copied()
        .filter(|&e| Some(e) != entry.via_edge())
        .collect();
    t.neighbor_pos = 0;

    t.cursor.goto(L::NeighborLoopTop);
    Ok(())
}

fn neighbor_loop_top(t: &mut Traversal, _ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    if t.neighbor_pos < t.neighbors.len() {
        t.cursor.goto(L::CheckNeighbor);
    } else {
        t.visiting = None;
        t.cursor.end_iteration();
        t.cursor.goto(L::TopLoop);
    }
    Ok(())
}

/// Edge under consideration and the vertex at its far end
fn current_neighbor<'g>(
    t: &Traversal,
    ctx: &ActionContext<'g>,
) -> AlgorithmResult<(&'g Edge, VertexId)> {
    let vertex = t.visiting()?.vertex();
    let edge_id = *t.neighbors.get(t.neighbor_pos).ok_or_else(|| {
        AlgorithmError::AlgorithmFailed(format!(
            "neighbor {} of {} out of range",
            t.neighbor_pos, vertex
        ))
    })?;
    let edge = ctx.graph.edge(edge_id)?;
    let far = edge.other_endpoint(vertex).ok_or_else(|| {
        AlgorithmError::AlgorithmFailed(format!("{} is not incident to {}", edge_id, vertex))
    })?;
    Ok((edge, far))
}

fn check_neighbor(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let (_, far) = current_neighbor(t, ctx)?;
    if t.vertex_added[far.index()] {
        t.cursor.goto(L::DiscardOnDiscovery);
    } else {
        t.cursor.goto(L::DiscoverNeighbor);
    }
    Ok(())
}

fn discard_on_discovery(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let (edge, _) = current_neighbor(t, ctx)?;
    t.counters.discarded_on_discovery += 1;

    ctx.sink
        .mark_edge(edge.id, VisualStyle::DiscardedOnDiscovery, false);
    t.update_panel(ctx.sink);

    t.cursor.goto(L::NeighborLoopNext);
    Ok(())
}

fn discover_neighbor(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let (edge, far) = current_neighbor(t, ctx)?;
    let from = t.visiting()?;
    let value = (t.strategy.next_value)(&from, edge);

    let container = t.container_mut()?;
    let pending = container.contains_field_matching(LdvField::Vertex(far));
    container.add(LdvEntry::via(far, value, edge));
    t.rediscovered = pending.then_some(far);
    if !t.vertex_discovered[far.index()] {
        t.vertex_discovered[far.index()] = true;
        t.counters.discovered += 1;
    }
    t.edge_discovered[edge.id.index()] = true;

    if t.end != Some(far) {
        ctx.sink
            .mark_vertex(far, VisualStyle::Discovered, Z_DISCOVERED, false);
    }
    ctx.sink.mark_edge(edge.id, VisualStyle::Discovered, false);
    t.update_panel(ctx.sink);

    t.cursor.goto(L::NeighborLoopNext);
    Ok(())
}

fn neighbor_loop_next(t: &mut Traversal, _ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    t.neighbor_pos += 1;
    t.cursor.goto(L::NeighborLoopTop);
    Ok(())
}

fn finish_component(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    let entries = &t.tree[t.component_start..];
    let component = Component {
        vertices: entries.iter().map(|e| e.vertex()).collect(),
        edges: entries.iter().filter_map(|e| e.via_edge()).collect(),
    };

    let style = VisualStyle::Component(t.components.len());
    for &v in &component.vertices {
        ctx.sink.mark_vertex(v, style, Z_ADDED, false);
    }
    for &e in &component.edges {
        ctx.sink.mark_edge(e, style, false);
    }

    t.components.push(component);
    t.component_start = t.tree.len();
    t.update_panel(ctx.sink);

    t.cursor.end_iteration();
    t.cursor.goto(L::SeedNextComponent);
    Ok(())
}

fn seed_next_component(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    match t.vertex_added.iter().position(|&added| !added) {
        None => {
            t.outcome = TraversalOutcome::Spanned;
            t.cursor.goto(L::Cleanup);
        }
        Some(index) => {
            let vertex = VertexId::from_index(index);
            t.container_mut()?.add(LdvEntry::seed(vertex, 0.0));
            t.vertex_discovered[index] = true;
            t.counters.discovered += 1;

            ctx.sink
                .mark_vertex(vertex, VisualStyle::Start, Z_ENDPOINT, false);
            t.update_panel(ctx.sink);
            t.cursor.goto(L::TopLoop);
        }
    }
    Ok(())
}

fn cleanup(t: &mut Traversal, ctx: &mut ActionContext<'_>) -> AlgorithmResult<()> {
    t.visiting = None;

    match t.outcome {
        TraversalOutcome::PathFound => {
            let path = t.reconstruct_path()?;
            for &v in &path.vertices {
                ctx.sink.mark_vertex(v, VisualStyle::OnPath, Z_VISITING, false);
            }
            for &e in &path.edges {
                ctx.sink.mark_edge(e, VisualStyle::OnPath, false);
            }
            t.path = Some(path);
        }
        TraversalOutcome::SearchFailed => {
            if let Some(end) = t.end {
                ctx.sink
                    .mark_vertex(end, VisualStyle::SearchFailed, Z_ENDPOINT, false);
            }
        }
        TraversalOutcome::Spanned => {}
        outcome => {
            return Err(AlgorithmError::AlgorithmFailed(format!(
                "cleanup reached with outcome {:?}",
                outcome
            )))
        }
    }

    t.update_panel(ctx.sink);
    t.cursor.finish();
    Ok(())
}
