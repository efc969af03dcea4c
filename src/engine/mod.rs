/// Stepped-execution engine
///
/// This module drives algorithms written as action tables:
/// - action: labels, actions, tables and the walk cursor
/// - machine: algorithm instances as seen by the controller
/// - controller: lifecycle status and step scheduling
/// - driver: async auto-advance loop with revocable continuations
/// - sink: visualization output
/// - status: controller lifecycle statuses

pub mod action;
pub mod controller;
pub mod driver;
pub mod machine;
pub mod sink;
pub mod status;

pub use action::{Action, ActionContext, ActionLabel, ActionState, ActionTable, Cursor, Next};
pub use controller::{Continuation, Controller, Granularity, StepDelay, StepReport};
pub use driver::{run_shared, spawn_driver, SharedController};
pub use machine::{Algorithm, Machine, StepRecord, SteppedAlgorithm};
pub use sink::{NullSink, RecordingSink, SinkEvent, TracingSink, VisualStyle, VisualizationSink};
pub use status::{AlgorithmStatus, DataKind};

use crate::algorithms::AlgorithmError;
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The cursor names a label the table has no action for
    #[error("Internal error in {table}: no action named {label}")]
    UnknownAction { table: String, label: String },

    /// A declared successor has no action
    #[error("Invalid action table {table}: {action} leads to {target}, which has no action")]
    UnresolvedAction {
        table: String,
        action: String,
        target: String,
    },

    #[error("Invalid action table {table}: duplicate action {label}")]
    DuplicateAction { table: String, label: String },

    /// An action was requested after the walk reached DONE
    #[error("Internal error in {table}: walk already reached DONE")]
    Finished { table: String },

    #[error("Cannot {operation} while {status}")]
    InvalidTransition {
        operation: &'static str,
        status: AlgorithmStatus,
    },

    #[error("No data loaded")]
    NoData,

    #[error("No algorithm selected")]
    NoAlgorithm,

    #[error("Algorithm error: {0}")]
    Algorithm(#[from] AlgorithmError),
}

impl EngineError {
    /// Check whether the error is a defect in an action table rather
    /// than a refused request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownAction { .. }
                | EngineError::UnresolvedAction { .. }
                | EngineError::DuplicateAction { .. }
                | EngineError::Finished { .. }
                | EngineError::Algorithm(_)
        )
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
