//! Reading the transition artifact back.
//!
//! The artifact is a two-column table: a `from_state,to_state` header, then
//! one row per edge with each state rendered as a bit string in registry
//! order. Downstream rule extraction reads it; tests use [`read_transitions`]
//! to check what a run wrote.

use std::{fs, path::Path};

use boolnet_core::{ParseStateError, StateVector, TransitionEdge};
use thiserror::Error;

/// Header row of the transition artifact.
pub const HEADER: &str = "from_state,to_state";

/// Errors reading a transition artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// First line is not the expected header
    #[error("expected header `{HEADER}`, found `{found}`")]
    BadHeader {
        /// Line actually found (empty for an empty file)
        found: String,
    },

    /// Row does not have exactly two comma-separated fields
    #[error("line {line}: expected `from,to`")]
    MalformedRow {
        /// 1-based line number
        line: usize,
    },

    /// A field is not a valid bit string
    #[error("line {line}: {source}")]
    InvalidState {
        /// 1-based line number
        line: usize,
        /// Parse failure
        #[source]
        source: ParseStateError,
    },

    /// Row width differs from the first row
    #[error("line {line}: state has {actual} bits, expected {expected}")]
    WidthMismatch {
        /// 1-based line number
        line: usize,
        /// Width of the first row
        expected: usize,
        /// Width on this row
        actual: usize,
    },
}

/// Parse artifact text into edges, in file order.
pub fn parse_transitions(text: &str) -> Result<Vec<TransitionEdge>, ArtifactError> {
    let mut lines = text.lines();
    match lines.next() {
        Some(HEADER) => {},
        other => {
            return Err(ArtifactError::BadHeader { found: other.unwrap_or_default().to_string() });
        },
    }

    let mut width = None;
    let mut edges = Vec::new();
    for (offset, row) in lines.enumerate() {
        let line = offset + 2;
        if row.is_empty() {
            continue;
        }
        let Some((from, to)) = row.split_once(',') else {
            return Err(ArtifactError::MalformedRow { line });
        };
        if to.contains(',') {
            return Err(ArtifactError::MalformedRow { line });
        }

        let parse = |field: &str| {
            StateVector::parse(field).map_err(|source| ArtifactError::InvalidState { line, source })
        };
        let edge = TransitionEdge::new(parse(from)?, parse(to)?);

        let expected = *width.get_or_insert(edge.from.len());
        for actual in [edge.from.len(), edge.to.len()] {
            if actual != expected {
                return Err(ArtifactError::WidthMismatch { line, expected, actual });
            }
        }
        edges.push(edge);
    }
    Ok(edges)
}

/// Read and parse the artifact at `path`.
pub fn read_transitions(path: impl AsRef<Path>) -> Result<Vec<TransitionEdge>, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|err| ArtifactError::Io(err.to_string()))?;
    parse_transitions(&text)
}
