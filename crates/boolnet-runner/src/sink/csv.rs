//! CSV transition artifact on disk.

use std::{
    fs::File,
    io::{self, Seek, SeekFrom, Write},
    path::Path,
};

use boolnet_core::TransitionEdge;

use super::{EdgeSink, SinkError};
use crate::artifact::HEADER;

/// Writes the `from_state,to_state` table consumed by rule extraction.
///
/// The file is created (or truncated) on [`CsvFileSink::create`]; the header
/// is written once and every batch is rendered in full before a single
/// write. If that write fails, the file is cut back to the end of the
/// previous batch, so the artifact never ends in a partial record.
pub struct CsvFileSink {
    out: RecordWriter<File>,
}

impl CsvFileSink {
    /// Create or truncate the artifact at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self { out: RecordWriter::new(file) })
    }
}

impl EdgeSink for CsvFileSink {
    fn write_header(&mut self) -> Result<(), SinkError> {
        self.out.push_line(HEADER)
    }

    fn append_batch(&mut self, _task: usize, edges: &[TransitionEdge]) -> Result<(), SinkError> {
        self.out.push_batch(edges)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.out.inner.flush()?;
        Ok(())
    }
}

/// Destination that can be cut back to an earlier length.
pub trait Rewind: Write {
    /// Truncate to `len` bytes and continue writing from there.
    fn rewind_to(&mut self, len: u64) -> io::Result<()>;
}

impl Rewind for File {
    fn rewind_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.seek(SeekFrom::Start(len))?;
        Ok(())
    }
}

/// Writes whole batches and only ever leaves whole batches behind.
struct RecordWriter<W> {
    inner: W,
    block: String,
    /// Bytes of complete batches known to be in `inner`
    committed: u64,
}

impl<W: Rewind> RecordWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, block: String::new(), committed: 0 }
    }

    fn push_line(&mut self, line: &str) -> Result<(), SinkError> {
        self.block.clear();
        self.block.push_str(line);
        self.block.push('\n');
        self.commit()
    }

    fn push_batch(&mut self, edges: &[TransitionEdge]) -> Result<(), SinkError> {
        self.block.clear();
        for edge in edges {
            self.block.push_str(&edge.to_string());
            self.block.push('\n');
        }
        self.commit()
    }

    /// Write the rendered block, or cut `inner` back to `committed` on failure.
    fn commit(&mut self) -> Result<(), SinkError> {
        if self.block.is_empty() {
            return Ok(());
        }

        match self.inner.write_all(self.block.as_bytes()) {
            Ok(()) => {
                self.committed += self.block.len() as u64;
                Ok(())
            },
            Err(err) => {
                tracing::warn!(
                    committed = self.committed,
                    error = %err,
                    "artifact write failed, truncating to last batch"
                );
                self.inner.rewind_to(self.committed)?;
                Err(err.into())
            },
        }
    }
}
