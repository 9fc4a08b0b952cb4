//! Test harness for Boolean network simulation.
//!
//! # Model-Based Testing
//!
//! The [`model`] module is a slow, name-keyed reference implementation of
//! the transition function and tracer. Tests trace the same initial states
//! through both and compare the trajectories.
//!
//! # Invariant Testing
//!
//! The [`invariants`] module checks properties every trace must satisfy:
//! clamps hold, free-running nodes stay frozen, edges chain one update at a
//! time, classification matches the edges, and the written artifact holds
//! exactly the traced edges. Use [`InvariantRegistry::standard()`] for the
//! full set.
//!
//! # Generators
//!
//! [`networks`] builds seeded random networks and a few structured ones
//! (counters, a toggle pair) as rule text.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod networks;

pub use invariants::{
    ArtifactConservation, ChainContinuity, ClampsHold, ClassificationConsistent, FreeRunningFrozen,
    Invariant, InvariantKind, InvariantRegistry, InvariantResult, ObservedTrace, TraceSnapshot,
    Violation,
};
pub use model::{ModelNetwork, ReferenceTracer};
pub use networks::{
    NetworkSource, RandomNetworkConfig, counter, counter_bit, random_network, toggle_pair,
};
