//! Chaotic sink wrapper for fault injection testing
//!
//! Delegates to an inner sink but fails batch appends, either randomly at a
//! configured rate or deterministically after a number of successful
//! batches. Used to check that the coordinator stops writing after the first
//! output failure and still reports every task.

use boolnet_core::TransitionEdge;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{EdgeSink, SinkError};

const DEFAULT_SEED: u64 = 0x1234_5678_9ABC_DEF0;

enum FailureMode {
    /// Fail each append with this probability
    Rate { failure_rate: f64, rng: ChaCha8Rng },
    /// Succeed this many appends, then fail every one after
    After { remaining: usize },
}

/// Sink wrapper that injects append failures.
///
/// Header writes and flushes always pass through; only `append_batch` fails.
pub struct ChaoticSink<S> {
    inner: S,
    mode: FailureMode,
    appends_attempted: usize,
    failures_injected: usize,
}

impl<S: EdgeSink> ChaoticSink<S> {
    /// Create a chaotic wrapper with the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, DEFAULT_SEED)
    }

    /// Create with explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self::with_mode(inner, FailureMode::Rate {
            failure_rate,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Let `batches` appends through, then fail every later append.
    pub fn failing_after(inner: S, batches: usize) -> Self {
        Self::with_mode(inner, FailureMode::After { remaining: batches })
    }

    fn with_mode(inner: S, mode: FailureMode) -> Self {
        Self { inner, mode, appends_attempted: 0, failures_injected: 0 }
    }

    /// Underlying sink (for checking what made it through).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of `append_batch` calls.
    pub fn appends_attempted(&self) -> usize {
        self.appends_attempted
    }

    /// Number of appends that were failed on purpose.
    pub fn failures_injected(&self) -> usize {
        self.failures_injected
    }

    fn should_fail(&mut self) -> bool {
        match &mut self.mode {
            FailureMode::Rate { failure_rate, rng } => rng.gen_bool(*failure_rate),
            FailureMode::After { remaining } => {
                if *remaining == 0 {
                    true
                } else {
                    *remaining -= 1;
                    false
                }
            },
        }
    }
}

impl<S: EdgeSink> EdgeSink for ChaoticSink<S> {
    fn write_header(&mut self) -> Result<(), SinkError> {
        self.inner.write_header()
    }

    fn append_batch(&mut self, task: usize, edges: &[TransitionEdge]) -> Result<(), SinkError> {
        self.appends_attempted += 1;
        if self.should_fail() {
            self.failures_injected += 1;
            return Err(SinkError::Io(format!("chaos: injected append failure for task {task}")));
        }
        self.inner.append_batch(task, edges)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()
    }
}
