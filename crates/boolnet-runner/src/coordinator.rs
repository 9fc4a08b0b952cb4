//! Parallel run coordinator.
//!
//! Traces many initial states on a fixed-size worker pool over one shared,
//! read-only [`Network`]. Workers never touch the output: each finished
//! trajectory goes back over a channel and the coordinator thread appends it
//! to the sink as one batch, then reports progress. Results are consumed in
//! completion order, so the artifact's batch order is not deterministic
//! across runs but each batch is contiguous.
//!
//! # Failure handling
//!
//! - A task that errors or panics becomes a `Failed` report; other tasks are
//!   unaffected.
//! - The first sink failure stops all further writes and aborts tasks that
//!   have not started yet. Tasks already running finish and are still
//!   reported. The failure is returned in [`RunReport::output_error`].

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use boolnet_core::{EvalError, Network, StateVector, Tracer, Trajectory};
use rayon::ThreadPool;

use crate::{
    config::CoordinatorConfig,
    error::RunError,
    progress::{Progress, RunReport, TaskReport},
    sink::EdgeSink,
};

/// Failure reason for tasks skipped after an abort.
pub const ABORTED: &str = "run aborted before task started";

/// Cancels tasks that have not started yet.
///
/// Cloneable and shareable across threads. Once tripped it stays tripped.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Create an untripped handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the handle.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether the handle was tripped.
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

struct TaskResult {
    task: usize,
    outcome: Result<Trajectory, String>,
}

/// Fixed-size worker pool bound to one compiled network.
pub struct Coordinator {
    network: Arc<Network>,
    config: CoordinatorConfig,
    pool: ThreadPool,
    abort: AbortHandle,
}

impl Coordinator {
    /// Build the worker pool.
    ///
    /// # Errors
    ///
    /// - `RunError::Config` for zero workers or a zero step bound
    /// - `RunError::ThreadPool` if the pool cannot be created
    pub fn new(network: Arc<Network>, config: CoordinatorConfig) -> Result<Self, RunError> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("sim-worker-{i}"))
            .build()?;

        tracing::debug!(workers = config.workers, max_steps = config.max_steps, "worker pool ready");

        Ok(Self { network, config, pool, abort: AbortHandle::new() })
    }

    /// The shared network.
    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    /// Pool and tracer settings.
    pub fn config(&self) -> CoordinatorConfig {
        self.config
    }

    /// Handle for cancelling tasks from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Trace every initial state and write the edges to `sink`.
    ///
    /// Returns one task report per initial state, in completion order.
    /// `on_progress` runs on the calling thread after each task's batch has
    /// been handed to the sink.
    ///
    /// # Errors
    ///
    /// `RunError::Sink` if the header cannot be written. Later sink failures
    /// are reported in the returned [`RunReport`].
    pub fn run<S, F>(
        &self,
        initial_states: Vec<StateVector>,
        sink: &mut S,
        on_progress: F,
    ) -> Result<RunReport, RunError>
    where
        S: EdgeSink + ?Sized,
        F: FnMut(&Progress<'_>),
    {
        let tracer = self.config.tracer();
        self.run_with(initial_states, sink, on_progress, move |network: &Network, initial| {
            Tracer::with_config(network, tracer).trace(initial)
        })
    }

    fn run_with<S, F, T>(
        &self,
        initial_states: Vec<StateVector>,
        sink: &mut S,
        mut on_progress: F,
        trace: T,
    ) -> Result<RunReport, RunError>
    where
        S: EdgeSink + ?Sized,
        F: FnMut(&Progress<'_>),
        T: Fn(&Network, StateVector) -> Result<Trajectory, EvalError> + Send + Sync + 'static,
    {
        let total = initial_states.len();
        sink.write_header()?;

        tracing::info!(tasks = total, workers = self.config.workers, "dispatching tasks");

        let write_failed = AbortHandle::new();
        let trace = Arc::new(trace);
        let (tx, rx) = crossbeam_channel::unbounded::<TaskResult>();

        for (task, initial) in initial_states.into_iter().enumerate() {
            let tx = tx.clone();
            let network = Arc::clone(&self.network);
            let trace = Arc::clone(&trace);
            let abort = self.abort.clone();
            let write_failed = write_failed.clone();

            self.pool.spawn(move || {
                let outcome = if abort.is_aborted() || write_failed.is_aborted() {
                    Err(ABORTED.to_string())
                } else {
                    execute(&network, initial, &*trace)
                };
                // Receiver lives until every sender is dropped
                let _ = tx.send(TaskResult { task, outcome });
            });
        }
        drop(tx);

        let mut report = RunReport::default();
        for TaskResult { task, outcome } in rx {
            let task_report = match outcome {
                Ok(trajectory) => {
                    if report.output_error.is_none() {
                        match sink.append_batch(task, &trajectory.edges) {
                            Ok(()) => report.edges_written += trajectory.edges.len(),
                            Err(err) => {
                                tracing::error!(task, error = %err, "output write failed, aborting pending tasks");
                                write_failed.abort();
                                report.output_error = Some(err);
                            },
                        }
                    }
                    TaskReport::completed(task, &trajectory)
                },
                Err(reason) => TaskReport::failed(task, reason),
            };

            on_progress(&Progress { completed: report.tasks.len() + 1, total, report: &task_report });
            report.push(task_report);
        }

        if report.output_error.is_none()
            && let Err(err) = sink.flush()
        {
            tracing::error!(error = %err, "output flush failed");
            report.output_error = Some(err);
        }

        Ok(report)
    }
}

/// Run one trace, turning errors and panics into a failure reason.
fn execute<T>(network: &Network, initial: StateVector, trace: &T) -> Result<Trajectory, String>
where
    T: Fn(&Network, StateVector) -> Result<Trajectory, EvalError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| trace(network, initial))) {
        Ok(Ok(trajectory)) => Ok(trajectory),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("task panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
