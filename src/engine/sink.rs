/// Visualization sink
///
/// Actions report what they did through this trait: which pseudocode line
/// is active, how vertices and edges should be drawn, and the status and
/// panel texts. Every call is fire-and-forget; the engine never reads
/// anything back. Rendering lives outside this crate.

use crate::types::{EdgeId, VertexId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Drawing style of a vertex, edge, or pseudocode line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualStyle {
    Unvisited,
    Start,
    End,
    /// Currently being examined
    Visiting,
    /// Waiting in the discovery container
    Discovered,
    /// Part of the spanning tree
    Added,
    DiscardedOnDiscovery,
    DiscardedOnRemoval,
    /// On the reconstructed path
    OnPath,
    /// Current leader of a search
    Leader,
    SearchFailed,
    /// Member of the n-th connected component
    Component(usize),
}

impl fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualStyle::Component(n) => write!(f, "component{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Receiver of visualization updates
pub trait VisualizationSink: Send {
    /// Highlight a pseudocode element
    fn highlight(&mut self, code_id: &str, style: VisualStyle);

    /// Restyle a vertex marker; higher `z_order` draws on top
    fn mark_vertex(&mut self, vertex: VertexId, style: VisualStyle, z_order: i32, hidden: bool);

    /// Restyle an edge polyline
    fn mark_edge(&mut self, edge: EdgeId, style: VisualStyle, hidden: bool);

    /// Replace the status line
    fn set_status_text(&mut self, message: &str);

    /// Replace a keyed entry of the algorithm status panel
    fn set_panel_entry(&mut self, key: &str, html: &str);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl VisualizationSink for NullSink {
    fn highlight(&mut self, _code_id: &str, _style: VisualStyle) {}

    fn mark_vertex(&mut self, _vertex: VertexId, _style: VisualStyle, _z_order: i32, _hidden: bool) {
    }

    fn mark_edge(&mut self, _edge: EdgeId, _style: VisualStyle, _hidden: bool) {}

    fn set_status_text(&mut self, _message: &str) {}

    fn set_panel_entry(&mut self, _key: &str, _html: &str) {}
}

/// Sink that forwards every update to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl VisualizationSink for TracingSink {
    fn highlight(&mut self, code_id: &str, style: VisualStyle) {
        debug!(code_id, %style, "highlight");
    }

    fn mark_vertex(&mut self, vertex: VertexId, style: VisualStyle, z_order: i32, hidden: bool) {
        debug!(%vertex, %style, z_order, hidden, "mark vertex");
    }

    fn mark_edge(&mut self, edge: EdgeId, style: VisualStyle, hidden: bool) {
        debug!(%edge, %style, hidden, "mark edge");
    }

    fn set_status_text(&mut self, message: &str) {
        debug!(message, "status");
    }

    fn set_panel_entry(&mut self, key: &str, html: &str) {
        debug!(key, html, "panel");
    }
}

/// One recorded sink call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SinkEvent {
    Highlight {
        code_id: String,
        style: VisualStyle,
    },
    Vertex {
        vertex: VertexId,
        style: VisualStyle,
        z_order: i32,
        hidden: bool,
    },
    Edge {
        edge: EdgeId,
        style: VisualStyle,
        hidden: bool,
    },
    Status(String),
    Panel {
        key: String,
        html: String,
    },
}

/// Sink that records every call
///
/// Clones share one event log, so a caller can keep a handle after
/// handing a clone to a controller.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events so far
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Most recent status text
    pub fn last_status(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SinkEvent::Status(message) => Some(message.clone()),
            _ => None,
        })
    }

    /// Current panel contents, later entries replacing earlier ones
    pub fn panel(&self) -> HashMap<String, String> {
        let mut panel = HashMap::new();
        for event in self.events.lock().iter() {
            if let SinkEvent::Panel { key, html } = event {
                panel.insert(key.clone(), html.clone());
            }
        }
        panel
    }

    /// Latest style of each vertex that was marked
    pub fn vertex_styles(&self) -> HashMap<VertexId, VisualStyle> {
        let mut styles = HashMap::new();
        for event in self.events.lock().iter() {
            if let SinkEvent::Vertex { vertex, style, .. } = event {
                styles.insert(*vertex, *style);
            }
        }
        styles
    }

    /// Latest style of each edge that was marked
    pub fn edge_styles(&self) -> HashMap<EdgeId, VisualStyle> {
        let mut styles = HashMap::new();
        for event in self.events.lock().iter() {
            if let SinkEvent::Edge { edge, style, .. } = event {
                styles.insert(*edge, *style);
            }
        }
        styles
    }

    /// Pseudocode ids highlighted, in order
    pub fn highlights(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Highlight { code_id, .. } => Some(code_id.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().push(event);
    }
}

impl VisualizationSink for RecordingSink {
    fn highlight(&mut self, code_id: &str, style: VisualStyle) {
        self.push(SinkEvent::Highlight {
            code_id: code_id.to_string(),
            style,
        });
    }

    fn mark_vertex(&mut self, vertex: VertexId, style: VisualStyle, z_order: i32, hidden: bool) {
        self.push(SinkEvent::Vertex {
            vertex,
            style,
            z_order,
            hidden,
        });
    }

    fn mark_edge(&mut self, edge: EdgeId, style: VisualStyle, hidden: bool) {
        self.push(SinkEvent::Edge {
            edge,
            style,
            hidden,
        });
    }

    fn set_status_text(&mut self, message: &str) {
        self.push(SinkEvent::Status(message.to_string()));
    }

    fn set_panel_entry(&mut self, key: &str, html: &str) {
        self.push(SinkEvent::Panel {
            key: key.to_string(),
            html: html.to_string(),
        });
    }
}
