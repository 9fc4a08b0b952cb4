//! Per-task progress and the run summary.

use std::fmt;

use boolnet_core::{Trajectory, TrajectoryStatus};
use serde::Serialize;

use crate::sink::SinkError;

/// Outcome of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Trajectory reached a fixed point
    SteadyState,
    /// Trajectory reached a cycle of length two or more
    LimitCycle,
    /// Step bound hit before any state repeated
    MaxStepsReached,
    /// Task failed; the reason is on the report
    Failed,
}

impl From<TrajectoryStatus> for TaskStatus {
    fn from(status: TrajectoryStatus) -> Self {
        match status {
            TrajectoryStatus::SteadyState => Self::SteadyState,
            TrajectoryStatus::LimitCycle => Self::LimitCycle,
            TrajectoryStatus::MaxStepsReached => Self::MaxStepsReached,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SteadyState => f.write_str("steady state"),
            Self::LimitCycle => f.write_str("limit cycle"),
            Self::MaxStepsReached => f.write_str("max steps reached"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Progress record for one finished task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    /// Submission index of the task
    pub task: usize,
    /// Classification, or `Failed`
    pub status: TaskStatus,
    /// Edges in the trajectory (zero on failure)
    pub steps: usize,
    /// Attractor length (zero on failure or max steps)
    pub cycle_length: usize,
    /// Failure reason, set only when `status` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    /// Report for a successfully traced task.
    pub fn completed(task: usize, trajectory: &Trajectory) -> Self {
        Self {
            task,
            status: trajectory.status.into(),
            steps: trajectory.steps(),
            cycle_length: trajectory.cycle_length,
            error: None,
        }
    }

    /// Report for a failed task.
    pub fn failed(task: usize, reason: impl Into<String>) -> Self {
        Self { task, status: TaskStatus::Failed, steps: 0, cycle_length: 0, error: Some(reason.into()) }
    }

    /// Whether the task failed.
    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

/// Progress event handed to the caller as each task completes.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// Tasks finished so far, including this one
    pub completed: usize,
    /// Tasks submitted
    pub total: usize,
    /// The task that just finished
    pub report: &'a TaskReport,
}

impl Progress<'_> {
    /// Emit the standard progress line.
    pub fn log(&self) {
        let report = self.report;
        match &report.error {
            Some(reason) => tracing::warn!(
                task = report.task,
                status = %report.status,
                error = %reason,
                "run {}/{}: failed | {reason}",
                self.completed,
                self.total
            ),
            None => tracing::info!(
                task = report.task,
                status = %report.status,
                steps = report.steps,
                cycle_length = report.cycle_length,
                "run {}/{}: {} | steps = {}, cycle_length = {}",
                self.completed,
                self.total,
                report.status,
                report.steps,
                report.cycle_length
            ),
        }
    }
}

/// Per-status task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Tasks that reached a fixed point
    pub steady_state: usize,
    /// Tasks that reached a limit cycle
    pub limit_cycle: usize,
    /// Tasks that hit the step bound
    pub max_steps_reached: usize,
    /// Tasks that failed
    pub failed: usize,
}

impl StatusCounts {
    /// Count one task.
    pub fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::SteadyState => self.steady_state += 1,
            TaskStatus::LimitCycle => self.limit_cycle += 1,
            TaskStatus::MaxStepsReached => self.max_steps_reached += 1,
            TaskStatus::Failed => self.failed += 1,
        }
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.steady_state + self.limit_cycle + self.max_steps_reached + self.failed
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Sampling seed, when the run sampled its own initial states
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Task reports in completion order
    pub tasks: Vec<TaskReport>,
    /// Per-status counts over `tasks`
    pub counts: StatusCounts,
    /// Edges appended to the sink
    pub edges_written: usize,
    /// First output failure; nothing was written after it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_error: Option<SinkError>,
}

impl RunReport {
    /// Record a finished task.
    pub fn push(&mut self, report: TaskReport) {
        self.counts.record(report.status);
        self.tasks.push(report);
    }

    /// Whether every task completed and all output was written.
    pub fn is_success(&self) -> bool {
        self.counts.failed == 0 && self.output_error.is_none()
    }

    /// Emit the end-of-run summary.
    pub fn log_summary(&self) {
        tracing::info!(
            tasks = self.tasks.len(),
            steady_state = self.counts.steady_state,
            limit_cycle = self.counts.limit_cycle,
            max_steps_reached = self.counts.max_steps_reached,
            failed = self.counts.failed,
            edges_written = self.edges_written,
            "run complete"
        );
        if let Some(err) = &self.output_error {
            tracing::error!(error = %err, "output incomplete");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::*;

    fn report(task: usize, status: TaskStatus) -> TaskReport {
        TaskReport { task, status, steps: 3, cycle_length: 2, error: None }
    }

    #[test]
    fn status_display_matches_log_wording() {
        assert_eq!(TaskStatus::SteadyState.to_string(), "steady state");
        assert_eq!(TaskStatus::from(TrajectoryStatus::LimitCycle), TaskStatus::LimitCycle);
        assert_eq!(TaskStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn counts_follow_pushed_reports() {
        let mut run = RunReport::default();
        run.push(report(0, TaskStatus::LimitCycle));
        run.push(report(1, TaskStatus::LimitCycle));
        run.push(TaskReport::failed(2, "boom"));

        assert_eq!(run.counts.limit_cycle, 2);
        assert_eq!(run.counts.failed, 1);
        assert_eq!(run.counts.total(), 3);
        assert!(!run.is_success());
    }

    #[test]
    fn failed_report_has_zero_metrics() {
        let failed = TaskReport::failed(7, "state has 3 bits, network has 2 nodes");
        assert!(failed.is_failed());
        assert_eq!((failed.steps, failed.cycle_length), (0, 0));
        assert_eq!(failed.error.as_deref(), Some("state has 3 bits, network has 2 nodes"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged(progress: &Progress<'_>) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || progress.log());
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn progress_line_carries_structured_fields() {
        let task = report(3, TaskStatus::LimitCycle);
        let line = logged(&Progress { completed: 1, total: 5, report: &task });

        assert!(line.contains("run 1/5: limit cycle | steps = 3, cycle_length = 2"), "{line}");
        for field in ["task=3", "status=limit cycle", "steps=3", "cycle_length=2"] {
            assert!(line.contains(field), "missing {field}: {line}");
        }

        let failed = TaskReport::failed(0, "boom");
        let line = logged(&Progress { completed: 2, total: 5, report: &failed });
        assert!(line.contains("status=failed"), "{line}");
        assert!(line.contains("error=boom"), "{line}");
    }

    #[test]
    fn serializes_to_json() {
        let mut run = RunReport { seed: Some(9), ..RunReport::default() };
        run.push(report(0, TaskStatus::SteadyState));
        run.edges_written = 3;

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["seed"], 9);
        assert_eq!(json["tasks"][0]["status"], "steady_state");
        assert_eq!(json["counts"]["steady_state"], 1);
        assert_eq!(json["edges_written"], 3);
        assert!(json.get("output_error").is_none());
        assert!(json["tasks"][0].get("error").is_none());
    }
}
