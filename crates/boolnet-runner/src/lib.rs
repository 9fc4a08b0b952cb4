//! Parallel trajectory runs and the transition artifact.
//!
//! Wraps the pure simulation in `boolnet-core` with a worker pool, an output
//! sink and progress reporting.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   initial states   ┌─────────────────────────┐
//! │  simulate()   │ ─────────────────▶ │  Coordinator            │
//! │ (seed, sample)│                    │  rayon pool, N workers  │
//! └───────────────┘                    └────────────┬────────────┘
//!                                                   │ crossbeam channel
//!                                                   ▼ (completion order)
//!                                      ┌─────────────────────────┐
//!                                      │ single writer loop      │
//!                                      │ EdgeSink + progress log │
//!                                      └─────────────────────────┘
//! ```
//!
//! The network is compiled once and shared through an `Arc`; workers only
//! read it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod artifact;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod progress;
pub mod sink;

use std::sync::Arc;

pub use artifact::{ArtifactError, HEADER, parse_transitions, read_transitions};
use boolnet_core::{Network, sample_initial_states};
pub use config::{
    CoordinatorConfig, DEFAULT_OUTPUT, DEFAULT_SAMPLES, FALLBACK_WORKERS, RunConfig, parse_clamp,
};
pub use coordinator::{ABORTED, AbortHandle, Coordinator};
pub use error::{ConfigError, RunError};
pub use progress::{Progress, RunReport, StatusCounts, TaskReport, TaskStatus};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
pub use sink::{ChaoticSink, CsvFileSink, EdgeSink, MemorySink, SinkError};

/// Sample initial states and run them through a fresh coordinator.
///
/// Uses `config.seed` when set, otherwise draws a seed from the OS. The seed
/// is logged and recorded in the report so the run can be reproduced.
///
/// # Errors
///
/// Configuration, pool construction and header failures; see
/// [`Coordinator::run`].
pub fn simulate<S, F>(
    network: Arc<Network>,
    config: &RunConfig,
    sink: &mut S,
    on_progress: F,
) -> Result<RunReport, RunError>
where
    S: EdgeSink + ?Sized,
    F: FnMut(&Progress<'_>),
{
    config.validate()?;

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, samples = config.samples, nodes = network.len(), "sampling initial states");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let initial_states = sample_initial_states(&network, config.samples, &mut rng);

    let coordinator = Coordinator::new(network, config.coordinator)?;
    let mut report = coordinator.run(initial_states, sink, on_progress)?;
    report.seed = Some(seed);
    Ok(report)
}
