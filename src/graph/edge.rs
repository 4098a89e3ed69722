//! Edge type and related structures.
//!
//! Edges are the springs of the layout. Each edge has:
//! - Source and target node IDs (1-based, distinct)
//! - A positive weight that scales spring stiffness

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Weight given to sampled edges unless a mode derives its own.
pub const DEFAULT_EDGE_WEIGHT: f32 = 1.0;

/// An undirected spring between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// First endpoint.
    pub source_id: NodeId,
    /// Second endpoint.
    pub target_id: NodeId,
    /// Spring stiffness multiplier.
    pub weight: f32,
}

impl Edge {
    /// Create a new edge.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, weight: f32) -> Self {
        Self {
            source_id: source.into(),
            target_id: target.into(),
            weight,
        }
    }

    /// Buffer slots of both endpoints in a graph of `node_count` nodes.
    ///
    /// Returns `None` if either id is out of range, the edge is a self-loop,
    /// or the weight is not a positive finite number.
    pub fn index_pair(&self, node_count: usize) -> Option<(usize, usize)> {
        if self.source_id == self.target_id || !(self.weight.is_finite() && self.weight > 0.0) {
            return None;
        }
        let a = self.source_id.index(node_count)?;
        let b = self.target_id.index(node_count)?;
        Some((a, b))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge({} - {}, w={})",
            self.source_id.0, self.target_id.0, self.weight
        )
    }
}

/// Parse edges from flat triples `[src0, tgt0, w0, src1, tgt1, w1, ...]`.
///
/// A trailing partial triple is ignored. Ids are truncated to integers;
/// negative or non-finite ids become 0 and are later skipped by the simulator.
pub fn edges_from_triples(flat: &[f32]) -> Vec<Edge> {
    flat.chunks_exact(3)
        .map(|t| Edge::new(t[0] as u32, t[1] as u32, t[2]))
        .collect()
}

/// Flatten edges into `[src0, tgt0, w0, ...]` triples.
pub fn edges_to_triples(edges: &[Edge]) -> Vec<f32> {
    let mut flat = Vec::with_capacity(edges.len() * 3);
    for edge in edges {
        flat.push(edge.source_id.0 as f32);
        flat.push(edge.target_id.0 as f32);
        flat.push(edge.weight);
    }
    flat
}
