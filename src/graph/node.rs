//! Node identifiers.
//!
//! Nodes are numbered `1..=N` and keep their id for the lifetime of a graph
//! epoch. The simulator stores node state Structure-of-Arrays, so a node's
//! slot in those buffers is `id - 1`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest node count a simulation accepts.
pub const MAX_NODE_COUNT: usize = 10_000;

/// Stable 1-based node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The node for buffer slot `index`.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    /// Buffer slot of this node in a graph of `node_count` nodes.
    ///
    /// Returns `None` for id 0 and for ids past `node_count`.
    #[inline]
    pub fn index(self, node_count: usize) -> Option<usize> {
        let id = self.0 as usize;
        (id >= 1 && id <= node_count).then(|| id - 1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}
