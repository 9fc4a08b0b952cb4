//! Parallel run tests.
//!
//! Runs go through the real worker pool and sinks; results are checked
//! against the harness invariants after splitting the artifact back into
//! per-task blocks.

use std::{collections::HashMap, sync::Arc};

use boolnet_core::{ClampSet, Network, StateVector, Trajectory, TrajectoryStatus, TransitionEdge};
use boolnet_harness::{InvariantRegistry, RandomNetworkConfig, TraceSnapshot, counter, random_network};
use boolnet_runner::{
    ChaoticSink, Coordinator, CoordinatorConfig, CsvFileSink, MemorySink, RunConfig, RunReport,
    TaskStatus, read_transitions, simulate,
};
use proptest::prelude::*;

fn compile(rules: &str, clamps: &ClampSet) -> Arc<Network> {
    Arc::new(Network::compile(rules, clamps).expect("rules compile"))
}

fn state(text: &str) -> StateVector {
    StateVector::parse(text).expect("valid state")
}

fn config(workers: usize, max_steps: usize) -> CoordinatorConfig {
    CoordinatorConfig { workers, max_steps }
}

/// Rebuild trajectories from an artifact written in completion order.
fn split_artifact<'a>(
    network: &'a Network,
    max_steps: usize,
    report: &RunReport,
    edges: Vec<TransitionEdge>,
) -> TraceSnapshot<'a> {
    let mut snapshot = TraceSnapshot::new(network, max_steps);
    let mut offset = 0;
    for task in report.tasks.iter().filter(|task| !task.is_failed()) {
        let block = edges[offset..offset + task.steps].to_vec();
        offset += task.steps;

        let status = match task.status {
            TaskStatus::SteadyState => TrajectoryStatus::SteadyState,
            TaskStatus::LimitCycle => TrajectoryStatus::LimitCycle,
            TaskStatus::MaxStepsReached | TaskStatus::Failed => TrajectoryStatus::MaxStepsReached,
        };
        let initial = block[0].from.clone();
        snapshot = snapshot.with_trace(initial, Trajectory {
            edges: block,
            status,
            cycle_length: task.cycle_length,
        });
    }
    assert_eq!(offset, edges.len(), "artifact has edges no task accounts for");
    snapshot.with_artifact(edges)
}

#[test]
fn limit_cycle_written_to_csv() {
    let network = compile("A = NOT B\nB = NOT A\n", &ClampSet::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state_transitions.csv");

    let coordinator = Coordinator::new(network, config(2, 1000)).unwrap();
    let mut sink = CsvFileSink::create(&path).unwrap();
    let report = coordinator.run(vec![state("00")], &mut sink, |_| {}).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "from_state,to_state\n00,11\n11,00\n");
    assert_eq!(report.tasks.len(), 1);
    assert_eq!(report.tasks[0].status, TaskStatus::LimitCycle);
    assert_eq!((report.tasks[0].steps, report.tasks[0].cycle_length), (2, 2));
    assert_eq!(report.edges_written, 2);
    assert!(report.is_success());
}

#[test]
fn clamped_single_node_is_steady() {
    let network = compile("", &ClampSet::new().with("F", true));
    let coordinator = Coordinator::new(network, config(1, 1000)).unwrap();
    let sink = MemorySink::new();

    let report = coordinator.run(vec![state("1")], &mut sink.clone(), |_| {}).unwrap();

    assert_eq!(report.counts.steady_state, 1);
    assert_eq!(sink.edges(), [TransitionEdge::new(state("1"), state("1"))]);
}

#[test]
fn sampled_run_round_trips_through_csv() {
    let source = counter(4);
    let network = compile(&source.rules, &source.clamps);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let run = RunConfig { coordinator: config(4, 10), samples: 40, seed: Some(3) };
    let mut sink = CsvFileSink::create(&path).unwrap();
    let report = simulate(Arc::clone(&network), &run, &mut sink, |_| {}).unwrap();

    assert_eq!(report.seed, Some(3));
    assert_eq!(report.tasks.len(), 40);
    // Period 16 exceeds the bound of 10 from every state
    assert_eq!(report.counts.max_steps_reached, 40);
    assert_eq!(report.edges_written, 400);

    let edges = read_transitions(&path).unwrap();
    let snapshot = split_artifact(&network, 10, &report, edges);
    InvariantRegistry::standard().assert_all(&snapshot, "after a sampled counter run");
}

#[test]
fn failing_task_does_not_stop_others() {
    let network = compile("A = NOT B\nB = NOT A\n", &ClampSet::new());
    let coordinator = Coordinator::new(network, config(3, 1000)).unwrap();
    let sink = MemorySink::new();

    let states = vec![state("00"), state("101"), state("01"), state("11")];
    let report = coordinator.run(states, &mut sink.clone(), |_| {}).unwrap();

    assert_eq!(report.tasks.len(), 4);
    assert_eq!(report.counts.failed, 1);
    let failed = report.tasks.iter().find(|task| task.is_failed()).unwrap();
    assert_eq!(failed.task, 1);
    assert_eq!((failed.steps, failed.cycle_length), (0, 0));
    assert_eq!(failed.error.as_deref(), Some("state has 3 bits, network has 2 nodes"));

    let written: Vec<_> = sink.batches().iter().map(|(task, _)| *task).collect();
    assert_eq!(written.len(), 3);
    assert!(!written.contains(&1));
    assert!(report.output_error.is_none());
}

#[test]
fn output_failure_stops_writes_but_reports_every_task() {
    let network = compile("A = NOT B\nB = NOT A\n", &ClampSet::new());
    let coordinator = Coordinator::new(network, config(2, 1000)).unwrap();
    let mut sink = ChaoticSink::failing_after(MemorySink::new(), 2);

    let states = vec![state("00"); 20];
    let report = coordinator.run(states, &mut sink, |_| {}).unwrap();

    assert!(report.output_error.is_some());
    assert!(!report.is_success());
    assert_eq!(report.tasks.len(), 20);
    assert_eq!(report.counts.total(), 20);

    // Two batches made it, then exactly one failed append and no more
    assert_eq!(sink.inner().batches().len(), 2);
    assert_eq!(sink.appends_attempted(), 3);
    assert_eq!(report.edges_written, 4);
    assert_eq!(sink.inner().flushes(), 0);
}

#[test]
fn progress_reported_once_per_task_in_completion_order() {
    let network = compile("a = NOT a\nb = a\n", &ClampSet::new());
    let coordinator = Coordinator::new(network, config(4, 1000)).unwrap();
    let mut sink = MemorySink::new();
    let mut seen = Vec::new();

    let states = vec![state("00"), state("01"), state("10"), state("11"), state("00")];
    let report = coordinator
        .run(states, &mut sink, |progress| seen.push((progress.completed, progress.report.task)))
        .unwrap();

    let order: Vec<_> = report.tasks.iter().map(|task| task.task).collect();
    assert_eq!(seen.iter().map(|(_, task)| *task).collect::<Vec<_>>(), order);
    assert_eq!(seen.iter().map(|(completed, _)| *completed).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);

    let mut tasks = order.clone();
    tasks.sort_unstable();
    assert_eq!(tasks, [0, 1, 2, 3, 4]);
}

#[test]
fn same_seed_same_results() {
    let source = random_network(99, &RandomNetworkConfig { nodes: 8, ..Default::default() });
    let network = compile(&source.rules, &source.clamps);
    let run = RunConfig { coordinator: config(4, 50), samples: 30, seed: Some(1234) };

    let by_task = |report: &RunReport| {
        report
            .tasks
            .iter()
            .map(|task| (task.task, (task.status, task.steps, task.cycle_length)))
            .collect::<HashMap<_, _>>()
    };

    let first = simulate(Arc::clone(&network), &run, &mut MemorySink::new(), |_| {}).unwrap();
    let second = simulate(Arc::clone(&network), &run, &mut MemorySink::new(), |_| {}).unwrap();

    assert_eq!(by_task(&first), by_task(&second));
    assert_eq!(first.counts, second.counts);
    assert_eq!(first.edges_written, second.edges_written);
}

#[test]
fn zero_samples_writes_header_only() {
    let network = compile("a = NOT a\n", &ClampSet::new());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    let run = RunConfig { coordinator: config(2, 10), samples: 0, seed: Some(0) };
    let mut sink = CsvFileSink::create(&path).unwrap();
    let report = simulate(network, &run, &mut sink, |_| {}).unwrap();

    assert!(report.tasks.is_empty());
    assert!(read_transitions(&path).unwrap().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: parallel runs satisfy every invariant, artifact included
    #[test]
    fn prop_parallel_runs_hold_invariants(
        seed in any::<u64>(),
        nodes in 1usize..9,
        workers in 1usize..5,
        max_steps in 1usize..40,
    ) {
        let source = random_network(seed, &RandomNetworkConfig { nodes, ..Default::default() });
        let network = compile(&source.rules, &source.clamps);
        let run = RunConfig { coordinator: config(workers, max_steps), samples: 16, seed: Some(seed) };

        let sink = MemorySink::new();
        let report = simulate(Arc::clone(&network), &run, &mut sink.clone(), |_| {})?;

        prop_assert_eq!(report.tasks.len(), 16);
        prop_assert_eq!(report.counts.failed, 0);
        prop_assert_eq!(sink.header_writes(), 1);

        let snapshot = split_artifact(&network, max_steps, &report, sink.edges());
        let result = InvariantRegistry::standard().check_all(&snapshot);
        prop_assert!(result.is_ok(), "{:?}", result);
    }
}
