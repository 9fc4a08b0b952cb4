//! Standard invariant checks.

use std::collections::{HashMap, HashSet};

use boolnet_core::{StateVector, TrajectoryStatus, TransitionEdge};

use super::{Invariant, InvariantKind, InvariantResult, ObservedTrace, TraceSnapshot, Violation};

/// States of a trace in visit order: the initial state, then each edge's
/// target.
fn states(trace: &ObservedTrace) -> impl Iterator<Item = &StateVector> {
    std::iter::once(&trace.initial).chain(trace.trajectory.edges.iter().map(|edge| &edge.to))
}

fn violation(kind: InvariantKind, trace: usize, message: impl std::fmt::Display) -> Violation {
    Violation { invariant: kind, message: format!("trace {trace}: {message}") }
}

/// Clamped nodes hold their clamp value in every state, including the
/// initial one.
pub struct ClampsHold;

impl Invariant for ClampsHold {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ClampsHold
    }

    fn check(&self, snapshot: &TraceSnapshot<'_>) -> InvariantResult {
        let network = snapshot.network;
        for (i, trace) in snapshot.traces.iter().enumerate() {
            for (step, state) in states(trace).enumerate() {
                for (id, value) in network.clamped() {
                    if state.get(id) != Some(value) {
                        return Err(violation(
                            self.kind(),
                            i,
                            format_args!(
                                "step {step}: clamped node {} is {:?}, expected {value}",
                                network.registry().name(id).unwrap_or("?"),
                                state.get(id)
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Nodes with no rule and no clamp keep their initial value.
pub struct FreeRunningFrozen;

impl Invariant for FreeRunningFrozen {
    fn kind(&self) -> InvariantKind {
        InvariantKind::FreeRunningFrozen
    }

    fn check(&self, snapshot: &TraceSnapshot<'_>) -> InvariantResult {
        let network = snapshot.network;
        for (i, trace) in snapshot.traces.iter().enumerate() {
            for id in network.free_running() {
                let initial = trace.initial.get(id);
                if let Some((step, _)) = states(trace).enumerate().find(|(_, s)| s.get(id) != initial) {
                    return Err(violation(
                        self.kind(),
                        i,
                        format_args!(
                            "free-running node {} changed at step {step}",
                            network.registry().name(id).unwrap_or("?")
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Edges start at the initial state, chain end to start, and each edge is
/// exactly one synchronous update.
pub struct ChainContinuity;

impl Invariant for ChainContinuity {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ChainContinuity
    }

    fn check(&self, snapshot: &TraceSnapshot<'_>) -> InvariantResult {
        let network = snapshot.network;
        for (i, trace) in snapshot.traces.iter().enumerate() {
            let mut expected_from = &trace.initial;
            for (step, edge) in trace.trajectory.edges.iter().enumerate() {
                if &edge.from != expected_from {
                    return Err(violation(
                        self.kind(),
                        i,
                        format_args!("edge {step} starts at {}, expected {expected_from}", edge.from),
                    ));
                }
                match network.next_state(&edge.from) {
                    Ok(next) if next == edge.to => {},
                    Ok(next) => {
                        return Err(violation(
                            self.kind(),
                            i,
                            format_args!("edge {step} is {edge}, but {} steps to {next}", edge.from),
                        ));
                    },
                    Err(err) => return Err(violation(self.kind(), i, err)),
                }
                expected_from = &edge.to;
            }
        }
        Ok(())
    }
}

/// Status, cycle length and step count agree with the edges.
///
/// - Every trace has at most `max_steps` edges and no repeated source state
/// - Steady state: cycle length 1, last edge is a self-loop
/// - Limit cycle: cycle length >= 2, last edge closes back to the state
///   `cycle_length` edges earlier
/// - Max steps: cycle length 0, exactly `max_steps` edges
pub struct ClassificationConsistent;

impl Invariant for ClassificationConsistent {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ClassificationConsistent
    }

    fn check(&self, snapshot: &TraceSnapshot<'_>) -> InvariantResult {
        for (i, trace) in snapshot.traces.iter().enumerate() {
            let trajectory = &trace.trajectory;
            let edges = &trajectory.edges;
            let steps = trajectory.steps();
            let fail = |message: String| Err(violation(self.kind(), i, message));

            let mut sources = HashSet::new();
            if let Some(edge) = edges.iter().find(|edge| !sources.insert(&edge.from)) {
                return fail(format!("state {} visited twice", edge.from));
            }

            match trajectory.status {
                TrajectoryStatus::MaxStepsReached => {
                    if trajectory.cycle_length != 0 || steps != snapshot.max_steps {
                        return fail(format!(
                            "max steps with cycle_length {} after {steps} of {} steps",
                            trajectory.cycle_length, snapshot.max_steps
                        ));
                    }
                },
                status => {
                    if steps >= snapshot.max_steps {
                        return fail(format!("{status} after {steps} steps exceeds the bound"));
                    }
                    let cycle = trajectory.cycle_length;
                    let valid_length = match status {
                        TrajectoryStatus::SteadyState => cycle == 1,
                        TrajectoryStatus::LimitCycle | TrajectoryStatus::MaxStepsReached => cycle >= 2,
                    };
                    if !valid_length || cycle > steps {
                        return fail(format!("{status} with cycle_length {cycle} over {steps} steps"));
                    }
                    let (Some(last), Some(entry)) = (edges.last(), edges.get(steps - cycle)) else {
                        return fail(format!("{status} without edges"));
                    };
                    if last.to != entry.from {
                        return fail(format!(
                            "{status} closes at {}, expected {}",
                            last.to, entry.from
                        ));
                    }
                },
            }
        }
        Ok(())
    }
}

/// The artifact holds exactly the traces' edges, each trace as one
/// contiguous block.
///
/// Passes trivially when the snapshot has no artifact.
pub struct ArtifactConservation;

impl Invariant for ArtifactConservation {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ArtifactConservation
    }

    fn check(&self, snapshot: &TraceSnapshot<'_>) -> InvariantResult {
        let Some(artifact) = &snapshot.artifact else {
            return Ok(());
        };

        let mut counts: HashMap<&TransitionEdge, isize> = HashMap::new();
        for edge in artifact {
            *counts.entry(edge).or_default() += 1;
        }
        for edge in snapshot.traces.iter().flat_map(|trace| &trace.trajectory.edges) {
            *counts.entry(edge).or_default() -= 1;
        }
        if let Some((edge, diff)) = counts.iter().find(|(_, diff)| **diff != 0) {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("edge {edge} count differs by {diff} between artifact and traces"),
            });
        }

        for (i, trace) in snapshot.traces.iter().enumerate() {
            let edges = &trace.trajectory.edges;
            if !edges.is_empty() && !artifact.windows(edges.len()).any(|block| block == edges.as_slice()) {
                return Err(violation(self.kind(), i, "edges not written as one contiguous block"));
            }
        }
        Ok(())
    }
}
