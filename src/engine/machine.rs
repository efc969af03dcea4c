/// Algorithm instances
///
/// A `Machine` pairs an action table with the state it drives. The
/// controller holds machines as `dyn SteppedAlgorithm`, which hides the
/// label type and exposes only what scheduling needs.

use super::action::{ActionContext, ActionState, ActionTable, Cursor, Next};
use super::EngineResult;
use crate::algorithms::{AlgorithmResult, Selection};
use crate::storage::GraphSource;
use std::sync::Arc;

/// State of an algorithm that can be prepared and reported on
pub trait Algorithm: ActionState {
    /// Read the selection and validate it against the graph
    ///
    /// Runs before every start; the `START` action then re-initializes
    /// the mutable search state.
    fn prepare(&mut self, graph: &dyn GraphSource, selection: &Selection) -> AlgorithmResult<()>;

    /// Snapshot of results so far
    fn report(&self) -> serde_json::Value;
}

/// Outcome of one performed action, with the label erased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub label: String,
    pub code_id: &'static str,
    pub description: String,
    pub iteration_done: bool,
    pub done: bool,
}

/// Object-safe view of an algorithm instance used by the controller
pub trait SteppedAlgorithm: Send {
    /// Name of the algorithm's action table
    fn name(&self) -> &str;

    fn prepare(&mut self, graph: &dyn GraphSource, selection: &Selection) -> AlgorithmResult<()>;

    /// Point the cursor back at the start action
    fn rewind(&mut self);

    /// Perform the action under the cursor
    fn perform(&mut self, ctx: &mut ActionContext<'_>) -> EngineResult<StepRecord>;

    /// Label of the next action, or `None` once the walk is done
    fn next_action(&self) -> Option<String>;

    fn is_done(&self) -> bool {
        self.next_action().is_none()
    }

    /// Labels of all actions in table order
    fn action_names(&self) -> Vec<String>;

    fn report(&self) -> serde_json::Value;
}

/// Action table plus the state it drives
pub struct Machine<S: Algorithm> {
    table: Arc<ActionTable<S>>,
    state: S,
}

impl<S: Algorithm> Machine<S> {
    /// Create a machine with its cursor at the table's start action
    pub fn new(table: Arc<ActionTable<S>>, mut state: S) -> Self {
        *state.cursor_mut() = Cursor::at(table.start());
        Self { table, state }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn table(&self) -> &ActionTable<S> {
        &self.table
    }

    /// Perform actions until the walk reaches `DONE`
    ///
    /// Returns the number of actions performed.
    pub fn run_to_done(&mut self, ctx: &mut ActionContext<'_>) -> EngineResult<u64> {
        let mut performed = 0;
        while !self.state.cursor().is_done() {
            self.table.perform(&mut self.state, ctx)?;
            performed += 1;
        }
        Ok(performed)
    }
}

impl<S: Algorithm> SteppedAlgorithm for Machine<S> {
    fn name(&self) -> &str {
        self.table.name()
    }

    fn prepare(&mut self, graph: &dyn GraphSource, selection: &Selection) -> AlgorithmResult<()> {
        self.state.prepare(graph, selection)
    }

    fn rewind(&mut self) {
        *self.state.cursor_mut() = Cursor::at(self.table.start());
    }

    fn perform(&mut self, ctx: &mut ActionContext<'_>) -> EngineResult<StepRecord> {
        let performed = self.table.perform(&mut self.state, ctx)?;
        Ok(StepRecord {
            label: performed.label.to_string(),
            code_id: performed.code_id,
            description: performed.description,
            iteration_done: performed.iteration_done,
            done: performed.next == Next::Done,
        })
    }

    fn next_action(&self) -> Option<String> {
        match self.state.cursor().next {
            Next::Action(label) => Some(label.to_string()),
            Next::Done => None,
        }
    }

    fn action_names(&self) -> Vec<String> {
        self.table
            .actions()
            .iter()
            .map(|a| a.label.to_string())
            .collect()
    }

    fn report(&self) -> serde_json::Value {
        self.state.report()
    }
}
