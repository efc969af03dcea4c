/// Step scheduler
///
/// The controller owns the lifecycle status and decides how much of the
/// selected algorithm runs per request:
///
/// ```text
///  NoData ──load──▶ *Loaded ──select──▶ Selected ──start──▶ Running ⇄ Paused
///                                          ▲                   │
///                                          └──────reset────────┴──▶ Complete
/// ```
///
/// Work happens only inside `start_or_resume`, `step` and `resume`, all of
/// which take `&mut self`, so step requests are serialized by the borrow.
/// Auto-advance is expressed with `Continuation` tokens: every step taken
/// while running hands back a token carrying the delay before the next
/// one. Every issue or redemption of a token bumps a generation counter,
/// as does leaving `Running`. Only the newest unredeemed token is honored,
/// so at most one auto-advance stream exists.

use super::action::ActionContext;
use super::machine::{StepRecord, SteppedAlgorithm};
use super::sink::{VisualStyle, VisualizationSink};
use super::status::{AlgorithmStatus, DataKind};
use super::{EngineError, EngineResult};
use crate::algorithms::Selection;
use crate::config::PlaybackConfig;
use crate::storage::SharedGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Amount of work per step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Exactly one action
    Action,
    /// Actions until one ends an iteration
    Iteration,
    /// Actions until the walk reaches DONE
    Completion,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "action" => Ok(Granularity::Action),
            "iteration" => Ok(Granularity::Iteration),
            "completion" => Ok(Granularity::Completion),
            other => Err(format!("unknown step granularity: {}", other)),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Action => "action",
            Granularity::Iteration => "iteration",
            Granularity::Completion => "completion",
        };
        f.write_str(name)
    }
}

/// Speed setting of auto-advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDelay {
    /// Run to completion without suspending
    RunToCompletion,
    /// Take one step, then pause
    SingleStep,
    /// Take a step every interval
    Every(Duration),
}

impl StepDelay {
    /// Decode the speed control value: `0` runs to completion, negative
    /// single-steps, positive is a delay in milliseconds
    pub fn from_millis(ms: i64) -> Self {
        match ms {
            0 => StepDelay::RunToCompletion,
            ms if ms < 0 => StepDelay::SingleStep,
            ms => StepDelay::Every(Duration::from_millis(ms as u64)),
        }
    }

    /// Inverse of `from_millis`, with `-1` for single stepping
    pub fn as_millis(&self) -> i64 {
        match self {
            StepDelay::RunToCompletion => 0,
            StepDelay::SingleStep => -1,
            StepDelay::Every(d) => d.as_millis().min(i64::MAX as u128) as i64,
        }
    }
}

/// Permission to take the next auto-advance step
///
/// Redeemed once with `Controller::resume`. Becomes stale when it is
/// redeemed, when a newer token is issued, or when the controller leaves
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    generation: u64,
    delay: Duration,
}

impl Continuation {
    /// Time to wait before redeeming
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Result of a step request
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Actions performed by this request
    pub performed: u64,
    /// Last action performed
    pub last: Option<StepRecord>,
    /// Status after the request
    pub status: AlgorithmStatus,
    /// Present when auto-advance should continue
    pub continuation: Option<Continuation>,
}

/// Controller context
pub struct Controller {
    status: AlgorithmStatus,
    graph: Option<SharedGraph>,
    algorithm: Option<Box<dyn SteppedAlgorithm>>,
    selection: Selection,
    sink: Box<dyn VisualizationSink>,
    delay: StepDelay,
    granularity: Granularity,
    generation: u64,
    execution_counts: BTreeMap<String, u64>,
    actions_performed: u64,
    highlighted: Option<&'static str>,
}

impl Controller {
    /// Create a controller with no data loaded
    pub fn new(playback: &PlaybackConfig, sink: Box<dyn VisualizationSink>) -> Self {
        Self {
            status: AlgorithmStatus::NoData,
            graph: None,
            algorithm: None,
            selection: Selection::default(),
            sink,
            delay: StepDelay::from_millis(playback.delay_ms),
            granularity: playback.granularity,
            generation: 0,
            execution_counts: BTreeMap::new(),
            actions_performed: 0,
            highlighted: None,
        }
    }

    pub fn status(&self) -> AlgorithmStatus {
        self.status
    }

    pub fn graph(&self) -> Option<&SharedGraph> {
        self.graph.as_ref()
    }

    pub fn algorithm(&self) -> Option<&dyn SteppedAlgorithm> {
        self.algorithm.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// How often each action ran in the current run, by label
    pub fn execution_counts(&self) -> &BTreeMap<String, u64> {
        &self.execution_counts
    }

    /// Total actions performed in the current run
    pub fn actions_performed(&self) -> u64 {
        self.actions_performed
    }

    /// Label of the next action, if a run is in progress
    pub fn next_action(&self) -> Option<String> {
        self.algorithm.as_ref().and_then(|a| a.next_action())
    }

    pub fn delay(&self) -> StepDelay {
        self.delay
    }

    pub fn set_delay(&mut self, delay: StepDelay) {
        debug!(delay_ms = delay.as_millis(), "step delay changed");
        self.delay = delay;
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Set the granularity of auto-advance steps
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Check whether a continuation would still be honored
    pub fn is_current(&self, continuation: &Continuation) -> bool {
        continuation.generation == self.generation && self.status == AlgorithmStatus::Running
    }

    /// Make new data available
    ///
    /// Pauses any running algorithm and drops the selection.
    pub fn load(&mut self, graph: SharedGraph, kind: DataKind) {
        if self.status == AlgorithmStatus::Running {
            self.pause_running();
        }
        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            ?kind,
            "data loaded"
        );
        self.graph = Some(graph);
        self.algorithm = None;
        self.clear_counts();
        self.transition(kind.loaded_status());
    }

    /// Choose the algorithm and its parameters
    pub fn select(
        &mut self,
        algorithm: Box<dyn SteppedAlgorithm>,
        selection: Selection,
    ) -> EngineResult<()> {
        if self.graph.is_none() {
            return Err(EngineError::NoData);
        }
        if self.status == AlgorithmStatus::Running {
            self.pause_running();
        }

        info!(algorithm = algorithm.name(), ?selection, "algorithm selected");
        self.algorithm = Some(algorithm);
        self.selection = selection;
        self.clear_counts();
        self.transition(AlgorithmStatus::Selected);
        Ok(())
    }

    /// Start the selected algorithm, or resume a paused one
    ///
    /// From `Selected` or `Complete` the algorithm is prepared and its
    /// walk restarted. The first step is taken immediately.
    pub fn start_or_resume(&mut self) -> EngineResult<StepReport> {
        match self.status {
            AlgorithmStatus::Selected | AlgorithmStatus::Complete => {
                self.begin_run()?;
                self.transition(AlgorithmStatus::Running);
            }
            AlgorithmStatus::Paused => self.transition(AlgorithmStatus::Running),
            status => return Err(self.refuse("start", status)),
        }

        self.advance()
    }

    /// Stop auto-advance
    ///
    /// An action already in progress is never interrupted; outstanding
    /// continuations become stale.
    pub fn pause(&mut self) -> EngineResult<()> {
        match self.status {
            AlgorithmStatus::Running => {
                self.pause_running();
                Ok(())
            }
            status => Err(self.refuse("pause", status)),
        }
    }

    /// Perform one unit of work at the requested granularity
    ///
    /// From `Selected` this starts a new run in the paused state. While
    /// paused, the controller stays paused afterwards. Refused while
    /// running, since the pending continuation owns the next step.
    pub fn step(&mut self, granularity: Granularity) -> EngineResult<StepReport> {
        match self.status {
            AlgorithmStatus::Selected => {
                self.begin_run()?;
                self.transition(AlgorithmStatus::Paused);
                self.step_paused(granularity)
            }
            AlgorithmStatus::Paused => self.step_paused(granularity),
            status => Err(self.refuse("step", status)),
        }
    }

    /// Redeem a continuation
    ///
    /// Returns `Ok(None)` without doing any work if the continuation is
    /// stale.
    pub fn resume(&mut self, continuation: Continuation) -> EngineResult<Option<StepReport>> {
        if !self.is_current(&continuation) {
            debug!(
                token = continuation.generation,
                current = self.generation,
                status = %self.status,
                "stale continuation ignored"
            );
            return Ok(None);
        }
        self.revoke();
        self.advance().map(Some)
    }

    /// Abandon the current run
    ///
    /// A running algorithm is paused first. The selection is kept.
    pub fn reset(&mut self) -> EngineResult<()> {
        if self.status == AlgorithmStatus::Running {
            self.pause_running();
        }
        match (&self.algorithm, &self.graph) {
            (Some(algorithm), _) => {
                info!(algorithm = algorithm.name(), "run reset");
                self.clear_counts();
                self.transition(AlgorithmStatus::Selected);
                Ok(())
            }
            (None, Some(_)) => Ok(()),
            (None, None) => Err(EngineError::NoData),
        }
    }

    fn begin_run(&mut self) -> EngineResult<()> {
        let graph = self.graph.clone().ok_or(EngineError::NoData)?;
        self.clear_counts();
        let algorithm = self.algorithm.as_mut().ok_or(EngineError::NoAlgorithm)?;

        algorithm.prepare(graph.as_ref(), &self.selection)?;
        algorithm.rewind();
        self.sink
            .set_status_text(&format!("Starting {}", algorithm.name()));
        Ok(())
    }

    /// One auto-advance step while running
    fn advance(&mut self) -> EngineResult<StepReport> {
        let granularity = match self.delay {
            StepDelay::RunToCompletion => Granularity::Completion,
            _ => self.granularity,
        };
        self.step_running(granularity)
    }

    fn step_running(&mut self, granularity: Granularity) -> EngineResult<StepReport> {
        let (performed, last) = self.run_unit(granularity)?;
        let done = last.as_ref().map_or(false, |r| r.done);

        let mut continuation = None;
        if done {
            self.complete();
        } else {
            match self.delay {
                StepDelay::SingleStep => self.pause_running(),
                StepDelay::RunToCompletion => {
                    continuation = Some(self.continuation(Duration::ZERO));
                }
                StepDelay::Every(delay) => continuation = Some(self.continuation(delay)),
            }
        }

        Ok(StepReport {
            performed,
            last,
            status: self.status,
            continuation,
        })
    }

    fn step_paused(&mut self, granularity: Granularity) -> EngineResult<StepReport> {
        let (performed, last) = self.run_unit(granularity)?;
        if last.as_ref().map_or(false, |r| r.done) {
            self.complete();
        }
        Ok(StepReport {
            performed,
            last,
            status: self.status,
            continuation: None,
        })
    }

    /// Perform actions until the granularity is satisfied or the walk ends
    ///
    /// Any failure is fatal to the run: the controller is forced to
    /// `Paused` and the error is reported to the sink.
    fn run_unit(&mut self, granularity: Granularity) -> EngineResult<(u64, Option<StepRecord>)> {
        match self.perform_unit(granularity) {
            Ok(result) => Ok(result),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn perform_unit(&mut self, granularity: Granularity) -> EngineResult<(u64, Option<StepRecord>)> {
        let graph = self.graph.clone().ok_or(EngineError::NoData)?;
        let algorithm = self.algorithm.as_mut().ok_or(EngineError::NoAlgorithm)?;
        let sink = &mut *self.sink;

        let mut performed = 0;
        let mut last: Option<StepRecord> = None;

        loop {
            if algorithm.is_done() {
                break;
            }

            let record = {
                let mut ctx = ActionContext {
                    graph: graph.as_ref(),
                    sink: &mut *sink,
                };
                algorithm.perform(&mut ctx)?
            };
            performed += 1;
            self.actions_performed += 1;

            let count = self
                .execution_counts
                .entry(record.label.clone())
                .or_insert(0);
            *count += 1;
            sink.set_panel_entry(&format!("exec:{}", record.label), &count.to_string());

            if let Some(previous) = self.highlighted.replace(record.code_id) {
                if previous != record.code_id {
                    sink.highlight(previous, VisualStyle::Unvisited);
                }
            }
            sink.highlight(record.code_id, VisualStyle::Visiting);

            debug!(
                algorithm = algorithm.name(),
                action = %record.label,
                iteration_done = record.iteration_done,
                "{}",
                record.description
            );

            let finished = record.done
                || match granularity {
                    Granularity::Action => true,
                    Granularity::Iteration => record.iteration_done,
                    Granularity::Completion => false,
                };
            last = Some(record);
            if finished {
                break;
            }
        }

        if let Some(record) = &last {
            sink.set_status_text(&record.description);
        }
        Ok((performed, last))
    }

    fn complete(&mut self) {
        self.revoke();
        if let Some(code_id) = self.highlighted.take() {
            self.sink.highlight(code_id, VisualStyle::Unvisited);
        }
        info!(actions = self.actions_performed, "algorithm complete");
        self.transition(AlgorithmStatus::Complete);
    }

    fn fail(&mut self, err: EngineError) -> EngineError {
        error!(error = %err, status = %self.status, "step failed, pausing");
        if self.status.has_execution() && self.status != AlgorithmStatus::Complete {
            self.revoke();
            self.transition(AlgorithmStatus::Paused);
        }
        self.sink.set_status_text(&err.to_string());
        err
    }

    fn pause_running(&mut self) {
        self.revoke();
        self.transition(AlgorithmStatus::Paused);
    }

    fn continuation(&mut self, delay: Duration) -> Continuation {
        self.revoke();
        Continuation {
            generation: self.generation,
            delay,
        }
    }

    fn revoke(&mut self) {
        self.generation += 1;
    }

    fn clear_counts(&mut self) {
        self.execution_counts.clear();
        self.actions_performed = 0;
        self.highlighted = None;
    }

    fn refuse(&self, operation: &'static str, status: AlgorithmStatus) -> EngineError {
        warn!(operation, %status, "request refused");
        match status {
            AlgorithmStatus::NoData => EngineError::NoData,
            s if s.has_data() && !s.has_execution() && s != AlgorithmStatus::Selected => {
                EngineError::NoAlgorithm
            }
            _ => EngineError::InvalidTransition { operation, status },
        }
    }

    fn transition(&mut self, to: AlgorithmStatus) {
        if self.status != to {
            info!(from = %self.status, to = %to, "status change");
            self.status = to;
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("status", &self.status)
            .field("algorithm", &self.algorithm.as_ref().map(|a| a.name().to_string()))
            .field("selection", &self.selection)
            .field("delay", &self.delay)
            .field("granularity", &self.granularity)
            .field("generation", &self.generation)
            .field("actions_performed", &self.actions_performed)
            .finish()
    }
}
