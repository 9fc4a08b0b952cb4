//! Output sinks for transition edges.
//!
//! The coordinator is the only writer: workers hand their finished
//! trajectories back over a channel and the coordinator appends each task's
//! edges as one batch. A batch is never interleaved with another task's
//! edges, and edges inside a batch keep trajectory order.
//!
//! The trait is synchronous and object-safe so sinks can be layered (see
//! [`ChaoticSink`]).

mod chaotic;
mod csv;
mod memory;

use boolnet_core::TransitionEdge;
pub use chaotic::ChaoticSink;
pub use csv::CsvFileSink;
pub use memory::MemorySink;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while appending to an output artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SinkError {
    /// Underlying write failed
    #[error("I/O error: {0}")]
    Io(String),

    /// A thread panicked while holding the sink's lock
    #[error("sink lock poisoned")]
    Poisoned,
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Append-only, header-once destination for transition edges.
///
/// # Invariants
///
/// - `write_header` is called once, before any batch
/// - `append_batch` writes the whole batch contiguously, in order
/// - a failed write leaves no partial batch behind
pub trait EdgeSink: Send {
    /// Write the artifact header.
    fn write_header(&mut self) -> Result<(), SinkError>;

    /// Append one task's edges as a single contiguous unit.
    fn append_batch(&mut self, task: usize, edges: &[TransitionEdge]) -> Result<(), SinkError>;

    /// Flush buffered output.
    fn flush(&mut self) -> Result<(), SinkError>;
}

impl<S: EdgeSink + ?Sized> EdgeSink for Box<S> {
    fn write_header(&mut self) -> Result<(), SinkError> {
        (**self).write_header()
    }

    fn append_batch(&mut self, task: usize, edges: &[TransitionEdge]) -> Result<(), SinkError> {
        (**self).append_batch(task, edges)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}
