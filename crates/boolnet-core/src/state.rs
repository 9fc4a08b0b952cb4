//! State vectors and transition edges.

use std::fmt;

use crate::{error::ParseStateError, registry::NodeId};

/// Fixed-length tuple of bits indexed by registry position.
///
/// The canonical textual form (`Display`) is the bits concatenated in
/// registry order, e.g. `"0110"`. Two states are equal iff their canonical
/// strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateVector {
    bits: Vec<bool>,
}

impl StateVector {
    /// State with every bit cleared.
    pub fn zeros(len: usize) -> Self {
        Self { bits: vec![false; len] }
    }

    /// Wrap a bit vector.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Parse the canonical textual form.
    pub fn parse(text: &str) -> Result<Self, ParseStateError> {
        let bits = text
            .chars()
            .enumerate()
            .map(|(position, ch)| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(ParseStateError::InvalidBit { ch, position }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bits })
    }

    /// Parse the canonical textual form, requiring exactly `len` bits.
    pub fn parse_with_len(text: &str, len: usize) -> Result<Self, ParseStateError> {
        let state = Self::parse(text)?;
        if state.len() != len {
            return Err(ParseStateError::Length { expected: len, actual: state.len() });
        }
        Ok(state)
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if the vector has no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit of node `id`, `None` if out of range.
    pub fn get(&self, id: NodeId) -> Option<bool> {
        self.bits.get(id.index()).copied()
    }

    /// Overwrite the bit of node `id`. Out-of-range ids are ignored.
    pub fn set(&mut self, id: NodeId, value: bool) {
        if let Some(bit) = self.bits.get_mut(id.index()) {
            *bit = value;
        }
    }

    /// Bits in registry order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// One synchronous update step observed during a trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionEdge {
    /// State before the update
    pub from: StateVector,
    /// State after the update
    pub to: StateVector,
}

impl TransitionEdge {
    /// Create an edge from `from` to `to`.
    pub fn new(from: StateVector, to: StateVector) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for TransitionEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.from, self.to)
    }
}
