//! Graph primitives shared by the sampler and the simulator.
//!
//! Nodes are plain 1-based ids; all per-node state lives in the simulator's
//! Structure of Arrays (SoA) buffers.

mod edge;
mod node;

pub use edge::{DEFAULT_EDGE_WEIGHT, Edge, edges_from_triples, edges_to_triples};
pub use node::{MAX_NODE_COUNT, NodeId};
