/// Action tables
///
/// An algorithm is written as a finite table of named actions. Each action
/// performs one bounded unit of work and moves the algorithm's cursor to
/// the next action, or to `Next::Done`. Labels are an enum per algorithm,
/// and every successor an action declares is checked when the table is
/// built, so a table that could walk into a missing action is rejected
/// before it ever runs.

use super::sink::VisualizationSink;
use super::{EngineError, EngineResult};
use crate::algorithms::AlgorithmResult;
use crate::storage::GraphSource;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Label type of an action table
pub trait ActionLabel: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> ActionLabel for T where T: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// Where the walk continues after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Next<L> {
    Action(L),
    Done,
}

impl<L: fmt::Display> fmt::Display for Next<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Action(label) => write!(f, "{}", label),
            Next::Done => f.write_str("DONE"),
        }
    }
}

/// Walk position every algorithm maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<L> {
    /// Action to perform next
    pub next: Next<L>,
    /// Set by the action that ends a logical iteration
    pub iteration_done: bool,
}

impl<L: ActionLabel> Cursor<L> {
    pub fn at(label: L) -> Self {
        Self {
            next: Next::Action(label),
            iteration_done: false,
        }
    }

    /// Continue with `label`
    pub fn goto(&mut self, label: L) {
        self.next = Next::Action(label);
    }

    /// End the walk
    pub fn finish(&mut self) {
        self.next = Next::Done;
    }

    /// Mark the end of a logical iteration
    pub fn end_iteration(&mut self) {
        self.iteration_done = true;
    }

    pub fn is_done(&self) -> bool {
        self.next == Next::Done
    }
}

/// Algorithm state driven by an action table
pub trait ActionState: Send + 'static {
    type Label: ActionLabel;

    fn cursor(&self) -> &Cursor<Self::Label>;

    fn cursor_mut(&mut self) -> &mut Cursor<Self::Label>;
}

/// Collaborators an action may use
pub struct ActionContext<'a> {
    pub graph: &'a dyn GraphSource,
    pub sink: &'a mut dyn VisualizationSink,
}

/// Action body: does the work and moves the cursor
pub type Effect<S> = fn(&mut S, &mut ActionContext<'_>) -> AlgorithmResult<()>;

/// Human-readable account of what the action just did
pub type Describe<S> = fn(&S) -> String;

/// One named step of an algorithm
pub struct Action<S: ActionState> {
    pub label: S::Label,
    /// Pseudocode element highlighted while this action runs
    pub code_id: &'static str,
    pub effect: Effect<S>,
    pub describe: Describe<S>,
    /// Every place `effect` may move the cursor to
    pub successors: Vec<Next<S::Label>>,
}

impl<S: ActionState> Action<S> {
    pub fn new(
        label: S::Label,
        code_id: &'static str,
        effect: Effect<S>,
        describe: Describe<S>,
    ) -> Self {
        Self {
            label,
            code_id,
            effect,
            describe,
            successors: Vec::new(),
        }
    }

    /// Declare the actions this one may continue with
    pub fn leads_to(mut self, labels: impl IntoIterator<Item = S::Label>) -> Self {
        self.successors.extend(labels.into_iter().map(Next::Action));
        self
    }

    /// Declare that this action may end the walk
    pub fn may_finish(mut self) -> Self {
        self.successors.push(Next::Done);
        self
    }
}

impl<S: ActionState> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .field("code_id", &self.code_id)
            .field("successors", &self.successors)
            .finish()
    }
}

/// What a single performed action reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Performed<L> {
    pub label: L,
    pub code_id: &'static str,
    pub description: String,
    pub iteration_done: bool,
    pub next: Next<L>,
}

/// Ordered set of actions with one start label
pub struct ActionTable<S: ActionState> {
    name: String,
    start: S::Label,
    actions: Vec<Action<S>>,
    index: HashMap<S::Label, usize>,
}

impl<S: ActionState> ActionTable<S> {
    /// Build a table, checking it is closed
    ///
    /// # Errors
    /// * `DuplicateAction` if two actions share a label
    /// * `UnresolvedAction` if the start label or any declared successor
    ///   has no action
    pub fn new(
        name: impl Into<String>,
        start: S::Label,
        actions: Vec<Action<S>>,
    ) -> EngineResult<Self> {
        let name = name.into();
        let mut index = HashMap::with_capacity(actions.len());

        for (i, action) in actions.iter().enumerate() {
            if index.insert(action.label, i).is_some() {
                return Err(EngineError::DuplicateAction {
                    table: name,
                    label: action.label.to_string(),
                });
            }
        }

        if !index.contains_key(&start) {
            return Err(EngineError::UnresolvedAction {
                table: name,
                action: "START".to_string(),
                target: start.to_string(),
            });
        }

        for action in &actions {
            for successor in &action.successors {
                if let Next::Action(target) = successor {
                    if !index.contains_key(target) {
                        return Err(EngineError::UnresolvedAction {
                            table: name,
                            action: action.label.to_string(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            name,
            start,
            actions,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> S::Label {
        self.start
    }

    /// Actions in table order
    pub fn actions(&self) -> &[Action<S>] {
        &self.actions
    }

    /// Look up an action by label
    pub fn get(&self, label: S::Label) -> EngineResult<&Action<S>> {
        self.index
            .get(&label)
            .map(|&i| &self.actions[i])
            .ok_or_else(|| EngineError::UnknownAction {
                table: self.name.clone(),
                label: label.to_string(),
            })
    }

    /// Perform the action the cursor points at
    ///
    /// Clears `iteration_done` before running the effect, so the flag
    /// reports whether this particular action ended an iteration.
    pub fn perform(
        &self,
        state: &mut S,
        ctx: &mut ActionContext<'_>,
    ) -> EngineResult<Performed<S::Label>> {
        let label = match state.cursor().next {
            Next::Action(label) => label,
            Next::Done => {
                return Err(EngineError::Finished {
                    table: self.name.clone(),
                })
            }
        };
        let action = self.get(label)?;

        state.cursor_mut().iteration_done = false;
        (action.effect)(state, ctx)?;

        let cursor = *state.cursor();
        Ok(Performed {
            label,
            code_id: action.code_id,
            description: (action.describe)(state),
            iteration_done: cursor.iteration_done,
            next: cursor.next,
        })
    }
}

impl<S: ActionState> fmt::Debug for ActionTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTable")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("actions", &self.actions)
            .finish()
    }
}
