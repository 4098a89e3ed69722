//! R-tree over a position snapshot, using the rstar crate.
//!
//! Consumers build this from the snapshot they hold to answer picking
//! queries (which node is under the cursor, what lies in a selection box)
//! without asking the simulator.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::channel::PositionSnapshot;
use crate::graph::NodeId;

/// A point in the index with its node ID.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NodePoint {
    id: NodeId,
    x: f32,
    y: f32,
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Hit-testing index for one snapshot.
pub struct SnapshotIndex {
    tree: RTree<NodePoint>,
    epoch: u64,
    sequence: u64,
}

impl SnapshotIndex {
    /// Bulk-load every finite position in `snapshot`.
    pub fn from_snapshot(snapshot: &PositionSnapshot) -> Self {
        let points = snapshot
            .x
            .iter()
            .zip(&snapshot.y)
            .enumerate()
            .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
            .map(|(i, (&x, &y))| NodePoint {
                id: NodeId::from_index(i),
                x,
                y,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
            epoch: snapshot.epoch,
            sequence: snapshot.sequence,
        }
    }

    /// Whether this index was built from `snapshot`.
    pub fn matches(&self, snapshot: &PositionSnapshot) -> bool {
        self.epoch == snapshot.epoch && self.sequence == snapshot.sequence
    }

    /// Find the nearest node within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<NodeId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.id)
    }

    /// Find all nodes within a rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    /// Find all nodes within a radius of a point.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<NodeId> {
        self.tree
            .locate_within_distance([x, y], radius * radius)
            .map(|point| point.id)
            .collect()
    }

    /// Get the number of indexed nodes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
