//! Invariant checking for trajectory runs.
//!
//! Invariants are properties every trace must satisfy regardless of the
//! network or initial state. Tests collect traces into a
//! [`TraceSnapshot`] and run the registered [`Invariant`] checks against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = TraceSnapshot::new(&network, max_steps).with_trace(initial, trajectory);
//! registry.assert_all(&snapshot, "after tracing");
//! ```

mod checks;

use std::fmt;

use boolnet_core::{Network, StateVector, Trajectory, TransitionEdge};
pub use checks::{
    ArtifactConservation, ChainContinuity, ClampsHold, ClassificationConsistent, FreeRunningFrozen,
};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Which invariant a violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    /// Clamped positions hold their value in every state
    ClampsHold,
    /// Positions with no rule and no clamp never change
    FreeRunningFrozen,
    /// Edges start at the initial state, chain, and follow the rules
    ChainContinuity,
    /// Status, cycle length and step count agree with the edges
    ClassificationConsistent,
    /// The artifact holds exactly the edges of the traces
    ArtifactConservation,
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClampsHold => "clamps_hold",
            Self::FreeRunningFrozen => "free_running_frozen",
            Self::ChainContinuity => "chain_continuity",
            Self::ClassificationConsistent => "classification_consistent",
            Self::ArtifactConservation => "artifact_conservation",
        })
    }
}

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Violated invariant.
    pub invariant: InvariantKind,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// One traced initial state.
#[derive(Debug, Clone)]
pub struct ObservedTrace {
    /// State the trace started from
    pub initial: StateVector,
    /// What the tracer produced
    pub trajectory: Trajectory,
}

/// Observable outcome of a run.
#[derive(Debug, Clone)]
pub struct TraceSnapshot<'a> {
    /// Network the traces ran over
    pub network: &'a Network,
    /// Step bound the traces ran with
    pub max_steps: usize,
    /// Traces in any order
    pub traces: Vec<ObservedTrace>,
    /// Edges read back from the output, when the run wrote any
    pub artifact: Option<Vec<TransitionEdge>>,
}

impl<'a> TraceSnapshot<'a> {
    /// Empty snapshot.
    pub fn new(network: &'a Network, max_steps: usize) -> Self {
        Self { network, max_steps, traces: Vec::new(), artifact: None }
    }

    /// Add a trace.
    #[must_use]
    pub fn with_trace(mut self, initial: StateVector, trajectory: Trajectory) -> Self {
        self.traces.push(ObservedTrace { initial, trajectory });
        self
    }

    /// Attach the edges read back from the output artifact.
    #[must_use]
    pub fn with_artifact(mut self, edges: Vec<TransitionEdge>) -> Self {
        self.artifact = Some(edges);
        self
    }
}

/// A property that must hold for every snapshot.
pub trait Invariant: Send + Sync {
    /// Which invariant this is.
    fn kind(&self) -> InvariantKind;

    /// Check the invariant against a snapshot.
    fn check(&self, snapshot: &TraceSnapshot<'_>) -> InvariantResult;
}

/// Registry of invariants to check.
///
/// Use [`InvariantRegistry::standard()`] for the full set.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with every standard invariant.
    ///
    /// Includes:
    /// - [`ClampsHold`]
    /// - [`FreeRunningFrozen`]
    /// - [`ChainContinuity`]
    /// - [`ClassificationConsistent`]
    /// - [`ArtifactConservation`] (no-op without an artifact)
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(ClampsHold);
        registry.add(FreeRunningFrozen);
        registry.add(ChainContinuity);
        registry.add(ClassificationConsistent);
        registry.add(ArtifactConservation);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants, collecting every violation.
    pub fn check_all(&self, snapshot: &TraceSnapshot<'_>) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(snapshot).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated. Meant for tests.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, snapshot: &TraceSnapshot<'_>, context: &str) {
        if let Err(violations) = self.check_all(snapshot) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use boolnet_core::{ClampSet, Tracer};

    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn empty_snapshot_passes() {
        let network = Network::compile("a = NOT a\n", &ClampSet::new()).unwrap();
        let snapshot = TraceSnapshot::new(&network, 10);
        assert!(InvariantRegistry::standard().check_all(&snapshot).is_ok());
    }

    #[test]
    fn real_traces_pass() {
        let network =
            Network::compile("a = NOT b\nb = a OR hold\n", &ClampSet::new().with("c", true))
                .unwrap();
        let tracer = Tracer::new(&network);
        let mut snapshot = TraceSnapshot::new(&network, tracer.max_steps());
        for bits in ["0010", "0110", "1011", "1111"] {
            let initial = StateVector::parse(bits).unwrap();
            let trajectory = tracer.trace(initial.clone()).unwrap();
            snapshot = snapshot.with_trace(initial, trajectory);
        }
        InvariantRegistry::standard().assert_all(&snapshot, "for a small network");
    }
}
