//! Trajectory tracing and attractor classification.
//!
//! The tracer repeatedly applies the transition function from one initial
//! state until the current state repeats or the step bound is hit:
//!
//! ```text
//!            ┌──────────── not seen: record edge, advance ───────────┐
//!            ▼                                                       │
//!   [current state] ── seen at previous position ──▶ SteadyState     │
//!            │       ── seen earlier ─────────────▶ LimitCycle       │
//!            │       ── step bound reached ───────▶ MaxStepsReached  │
//!            └───────────────────────────────────────────────────────┘
//! ```
//!
//! Revisits are detected through a map from state to first-visit index, so
//! each step costs O(1) amortized on top of the transition itself.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    error::EvalError,
    network::Network,
    state::{StateVector, TransitionEdge},
};

/// Default bound on the number of steps per trajectory.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Tracer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracerConfig {
    /// Number of loop iterations before giving up; a logical timeout
    pub max_steps: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self { max_steps: DEFAULT_MAX_STEPS }
    }
}

/// Long-run behaviour of one trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryStatus {
    /// The repeated state was the one visited immediately before: a fixed
    /// point
    SteadyState,
    /// The repeated state was visited earlier: a periodic orbit
    LimitCycle,
    /// No repeat within the step bound
    MaxStepsReached,
}

impl fmt::Display for TrajectoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SteadyState => "steady state",
            Self::LimitCycle => "limit cycle",
            Self::MaxStepsReached => "max steps reached",
        })
    }
}

/// Outcome of tracing one initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    /// Edges in trajectory order
    pub edges: Vec<TransitionEdge>,
    /// Classification
    pub status: TrajectoryStatus,
    /// Distinct states on the attractor; 0 when unresolved
    pub cycle_length: usize,
}

impl Trajectory {
    /// Number of synchronous updates performed, equal to the number of edges.
    pub fn steps(&self) -> usize {
        self.edges.len()
    }
}

/// Traces trajectories over a shared, immutable network.
#[derive(Debug, Clone, Copy)]
pub struct Tracer<'a> {
    network: &'a Network,
    config: TracerConfig,
}

impl<'a> Tracer<'a> {
    /// Create a tracer with the default step bound.
    pub fn new(network: &'a Network) -> Self {
        Self::with_config(network, TracerConfig::default())
    }

    /// Create a tracer with an explicit configuration.
    pub fn with_config(network: &'a Network, config: TracerConfig) -> Self {
        Self { network, config }
    }

    /// Configured step bound.
    pub fn max_steps(&self) -> usize {
        self.config.max_steps
    }

    /// Trace from `initial` until a revisit or the step bound.
    ///
    /// A revisit emits no edge. When the repeated state is the last one
    /// visited the trajectory is a steady state (cycle length 1); otherwise
    /// it is a limit cycle whose length is the number of states visited
    /// since the first occurrence of the repeat.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if `initial` was built for a different network.
    pub fn trace(&self, initial: StateVector) -> Result<Trajectory, EvalError> {
        let mut first_visit: HashMap<StateVector, usize> = HashMap::new();
        let mut edges = Vec::new();
        let mut current = initial;

        for _ in 0..self.config.max_steps {
            if let Some(&index) = first_visit.get(&current) {
                let visited = first_visit.len();
                let status = if index + 1 == visited {
                    TrajectoryStatus::SteadyState
                } else {
                    TrajectoryStatus::LimitCycle
                };
                return Ok(Trajectory { edges, status, cycle_length: visited - index });
            }

            first_visit.insert(current.clone(), first_visit.len());
            let next = self.network.next_state(&current)?;
            edges.push(TransitionEdge::new(current, next.clone()));
            current = next;
        }

        Ok(Trajectory { edges, status: TrajectoryStatus::MaxStepsReached, cycle_length: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ClampSet;

    fn state(text: &str) -> StateVector {
        StateVector::parse(text).unwrap()
    }

    fn edge(from: &str, to: &str) -> TransitionEdge {
        TransitionEdge::new(state(from), state(to))
    }

    #[test]
    fn toggle_pair_is_a_two_cycle() {
        let network = Network::compile("A = NOT B\nB = NOT A\n", &ClampSet::new()).unwrap();
        let trajectory = Tracer::new(&network).trace(state("00")).unwrap();

        assert_eq!(trajectory.edges, [edge("00", "11"), edge("11", "00")]);
        assert_eq!(trajectory.status, TrajectoryStatus::LimitCycle);
        assert_eq!(trajectory.cycle_length, 2);
        assert_eq!(trajectory.steps(), 2);
    }

    #[test]
    fn clamped_single_node_is_steady() {
        let network = Network::compile("", &ClampSet::new().with("F", true)).unwrap();
        let trajectory = Tracer::new(&network).trace(state("1")).unwrap();

        assert_eq!(trajectory.edges, [edge("1", "1")]);
        assert_eq!(trajectory.status, TrajectoryStatus::SteadyState);
        assert_eq!(trajectory.cycle_length, 1);
        assert_eq!(trajectory.steps(), 1);
    }

    #[test]
    fn transient_then_fixed_point() {
        // b copies a, a holds: "10" -> "11" -> "11"
        let network = Network::compile("b = a\n", &ClampSet::new()).unwrap();
        let trajectory = Tracer::new(&network).trace(state("10")).unwrap();

        assert_eq!(trajectory.edges, [edge("10", "11"), edge("11", "11")]);
        assert_eq!(trajectory.status, TrajectoryStatus::SteadyState);
        assert_eq!(trajectory.cycle_length, 1);
    }

    #[test]
    fn transient_then_cycle_counts_only_cycle_states() {
        // a holds; b oscillates only while a is 1.
        let network = Network::compile("b = a AND NOT b\n", &ClampSet::new()).unwrap();
        let trajectory = Tracer::new(&network).trace(state("10")).unwrap();

        assert_eq!(trajectory.edges, [edge("10", "11"), edge("11", "10")]);
        assert_eq!(trajectory.status, TrajectoryStatus::LimitCycle);
        assert_eq!(trajectory.cycle_length, 2);
    }

    #[test]
    fn step_bound_stops_long_transients() {
        let network = Network::compile("A = NOT B\nB = NOT A\n", &ClampSet::new()).unwrap();
        let tracer = Tracer::with_config(&network, TracerConfig { max_steps: 1 });
        let trajectory = tracer.trace(state("00")).unwrap();

        assert_eq!(trajectory.status, TrajectoryStatus::MaxStepsReached);
        assert_eq!(trajectory.cycle_length, 0);
        assert_eq!(trajectory.steps(), 1);
    }

    #[test]
    fn zero_step_bound_emits_nothing() {
        let network = Network::compile("a = a\n", &ClampSet::new()).unwrap();
        let tracer = Tracer::with_config(&network, TracerConfig { max_steps: 0 });
        let trajectory = tracer.trace(state("1")).unwrap();

        assert!(trajectory.edges.is_empty());
        assert_eq!(trajectory.status, TrajectoryStatus::MaxStepsReached);
    }

    #[test]
    fn mismatched_initial_state_is_an_error() {
        let network = Network::compile("a = b\n", &ClampSet::new()).unwrap();
        assert_eq!(
            Tracer::new(&network).trace(state("101")),
            Err(EvalError::StateLength { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn status_display_matches_progress_labels() {
        assert_eq!(TrajectoryStatus::SteadyState.to_string(), "steady state");
        assert_eq!(TrajectoryStatus::LimitCycle.to_string(), "limit cycle");
        assert_eq!(TrajectoryStatus::MaxStepsReached.to_string(), "max steps reached");
    }
}
