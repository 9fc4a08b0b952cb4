//! Synchronous Boolean network dynamics.
//!
//! Pure simulation logic with no I/O and no threads: everything here is safe
//! to share read-only across workers, and the runner crate supplies the
//! parallelism and the output artifact.
//!
//! # Pipeline
//!
//! ```text
//! rule text ──▶ parser ──▶ Network (registry + rules + clamps)
//!                                │
//!   initial state ──▶ Tracer ──▶ next_state ──▶ Expr::eval
//!                        │
//!                        ▼
//!                   Trajectory (edges, status, cycle length)
//! ```
//!
//! # Components
//!
//! - [`Network`]: compiled, immutable rule table over a [`NodeRegistry`]
//! - [`Expr`]: boolean expression tree and its evaluator
//! - [`next_state`]: the synchronous transition function
//! - [`Tracer`]: trajectory tracing and attractor classification
//! - [`sample_initial_states`]: clamp-respecting random initial states

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod expr;
pub mod network;
pub mod parser;
pub mod registry;
pub mod sampling;
pub mod state;
pub mod trajectory;
pub mod transition;

pub use error::{CompileError, EvalError, ParseStateError, SyntaxErrorKind};
pub use expr::Expr;
pub use network::{ClampSet, Network, NodeKind};
pub use parser::{MAX_DEPTH, RuleLine, is_node_name, parse_expr, parse_rules};
pub use registry::{NodeId, NodeRegistry};
pub use sampling::{sample_initial_state, sample_initial_states};
pub use state::{StateVector, TransitionEdge};
pub use trajectory::{DEFAULT_MAX_STEPS, Tracer, TracerConfig, Trajectory, TrajectoryStatus};
pub use transition::next_state;
