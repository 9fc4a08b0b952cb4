//! Node registry: the fixed mapping between node names and bit positions.
//!
//! A node's position in the registry *is* its bit index in every state
//! vector, so the ordering is lexicographic by name and never changes after
//! construction. Compiling the same rule text twice always yields the same
//! assignment.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Bit index of a node in every state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Position of the node's bit in a state vector.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, duplicate-free sequence of node names.
///
/// # Invariants
///
/// - Names are sorted lexicographically and unique
/// - Immutable once built; the registry is shared read-only by every worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRegistry {
    names: Vec<String>,
}

impl NodeRegistry {
    /// Build a registry from any collection of names.
    ///
    /// Duplicates collapse; input order is irrelevant.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self { names: unique.into_iter().collect() }
    }

    /// Number of nodes (and bits per state vector).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the registry has no nodes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look up the bit index of a node.
    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.names.binary_search_by(|probe| probe.as_str().cmp(name)).ok().map(NodeId)
    }

    /// Name of the node at `id`, if in range.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    /// Node names in bit order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All node ids in bit order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.names.len()).map(NodeId)
    }
}
