use std::sync::{Arc, Mutex};

use boolnet_core::TransitionEdge;

use super::{EdgeSink, SinkError};

/// In-memory sink for testing and embedding.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// coordinator and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkInner>>,
}

#[derive(Default)]
struct MemorySinkInner {
    header_writes: usize,
    /// Batches in append order: (task, edges)
    batches: Vec<(usize, Vec<TransitionEdge>)>,
    flushes: usize,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches in append order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test code.
    #[allow(clippy::expect_used)]
    pub fn batches(&self) -> Vec<(usize, Vec<TransitionEdge>)> {
        self.inner.lock().expect("Mutex poisoned").batches.clone()
    }

    /// All edges in append order.
    pub fn edges(&self) -> Vec<TransitionEdge> {
        self.batches().into_iter().flat_map(|(_, edges)| edges).collect()
    }

    /// Number of times the header was written.
    #[allow(clippy::expect_used)]
    pub fn header_writes(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").header_writes
    }

    /// Number of flushes.
    #[allow(clippy::expect_used)]
    pub fn flushes(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").flushes
    }
}

impl EdgeSink for MemorySink {
    fn write_header(&mut self) -> Result<(), SinkError> {
        self.inner.lock().map_err(|_| SinkError::Poisoned)?.header_writes += 1;
        Ok(())
    }

    fn append_batch(&mut self, task: usize, edges: &[TransitionEdge]) -> Result<(), SinkError> {
        let mut inner = self.inner.lock().map_err(|_| SinkError::Poisoned)?;
        inner.batches.push((task, edges.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.lock().map_err(|_| SinkError::Poisoned)?.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use boolnet_core::StateVector;

    use super::*;

    fn edge(from: &str, to: &str) -> TransitionEdge {
        TransitionEdge::new(StateVector::parse(from).unwrap(), StateVector::parse(to).unwrap())
    }

    #[test]
    fn clones_share_batches() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        writer.write_header().unwrap();
        writer.append_batch(3, &[edge("00", "11"), edge("11", "00")]).unwrap();
        writer.append_batch(1, &[edge("01", "01")]).unwrap();
        writer.flush().unwrap();

        assert_eq!(sink.header_writes(), 1);
        assert_eq!(sink.flushes(), 1);
        let tasks: Vec<_> = sink.batches().iter().map(|(task, _)| *task).collect();
        assert_eq!(tasks, [3, 1]);
        assert_eq!(sink.edges().len(), 3);
    }
}
