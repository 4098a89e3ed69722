//! Spatial indexing.
//!
//! - `grid`: uniform hash grid the simulator rebuilds every tick for
//!   bounded-radius neighbor queries
//! - `rtree`: R-tree over a published snapshot for consumer-side picking

mod grid;
mod rtree;

pub use grid::{CellKey, JITTER_EPSILON, SpatialGrid, pair_jitter};
pub use rtree::SnapshotIndex;
