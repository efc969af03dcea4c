/// Auto-advance driver
///
/// Runs a shared controller in "play" mode on the tokio runtime: take a
/// step, sleep for the continuation's delay, redeem it, repeat. The lock
/// is never held across an `.await`, so other tasks can pause, reset or
/// re-select between steps; the driver notices through its stale
/// continuation and returns.

use super::controller::Controller;
use super::status::AlgorithmStatus;
use super::EngineResult;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Controller shared between the driver and whoever pauses it
pub type SharedController = Arc<Mutex<Controller>>;

/// Start or resume the controller and keep stepping until it stops
/// running
///
/// Returns the status the controller was left in: `Complete` when the
/// walk finished, `Paused` when single stepping, paused by another task,
/// or stopped by an internal error reported through the sink.
pub async fn run_shared(controller: SharedController) -> EngineResult<AlgorithmStatus> {
    let first = controller.lock().start_or_resume()?;
    let mut continuation = first.continuation;

    while let Some(next) = continuation {
        if !next.delay().is_zero() {
            tokio::time::sleep(next.delay()).await;
        } else {
            tokio::task::yield_now().await;
        }

        let report = controller.lock().resume(next)?;
        match report {
            Some(report) => continuation = report.continuation,
            None => {
                debug!("driver stopped by revoked continuation");
                break;
            }
        }
    }

    let status = controller.lock().status();
    Ok(status)
}

/// Spawn `run_shared` onto the current tokio runtime
pub fn spawn_driver(controller: SharedController) -> JoinHandle<EngineResult<AlgorithmStatus>> {
    tokio::spawn(run_shared(controller))
}
