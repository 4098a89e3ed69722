//! Uniform spatial hash grid for bounded-radius neighbor queries.
//!
//! The grid is rebuilt from scratch every tick: O(n) build, and a neighbor
//! query visits only the 3×3 block of cells around a node. With the cell
//! size equal to the query radius, every node within that radius is in the
//! block; callers still filter by exact distance.

use std::collections::HashMap;

/// Cell coordinates, `(floor(x / cell_size), floor(y / cell_size))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub cx: i32,
    pub cy: i32,
}

impl CellKey {
    /// Cell containing the point `(x, y)`.
    ///
    /// Non-finite coordinates land in cell `(0, 0)`; very distant ones
    /// saturate at the `i32` bounds.
    #[inline]
    pub fn of(x: f32, y: f32, cell_size: f32) -> Self {
        Self {
            cx: (x / cell_size).floor() as i32,
            cy: (y / cell_size).floor() as i32,
        }
    }
}

/// Node indices bucketed by cell.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
    /// Cell of each node, by index.
    node_cells: Vec<CellKey>,
}

impl SpatialGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid over parallel coordinate slices.
    pub fn build(xs: &[f32], ys: &[f32], cell_size: f32) -> Self {
        let mut grid = Self::new();
        grid.rebuild(xs, ys, cell_size);
        grid
    }

    /// Re-bucket all nodes, reusing the grid's allocations.
    ///
    /// Only the first `min(xs.len(), ys.len())` nodes are indexed. A
    /// non-finite or non-positive `cell_size` falls back to 1.0.
    pub fn rebuild(&mut self, xs: &[f32], ys: &[f32], cell_size: f32) {
        self.cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };

        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.node_cells.clear();

        for (index, (&x, &y)) in xs.iter().zip(ys).enumerate() {
            let key = CellKey::of(x, y, self.cell_size);
            self.node_cells.push(key);
            self.cells.entry(key).or_default().push(index);
        }

        // Keep buckets that are still in use so their capacity carries over.
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    /// Cell size the grid was last built with.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.node_cells.len()
    }

    /// Check if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.node_cells.is_empty()
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Candidate neighbors of node `index`: every other node in the 3×3 block
    /// of cells centred on its own cell.
    ///
    /// Yields nothing for an index the grid does not hold.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let center = self.node_cells.get(index).copied();
        center
            .into_iter()
            .flat_map(|c| {
                (-1..=1).flat_map(move |dx: i32| {
                    (-1..=1).map(move |dy: i32| CellKey {
                        cx: c.cx.saturating_add(dx),
                        cy: c.cy.saturating_add(dy),
                    })
                })
            })
            .filter_map(move |key| self.cells.get(&key))
            .flatten()
            .copied()
            .filter(move |&other| other != index)
    }
}

/// Magnitude bound of [`pair_jitter`] along each axis.
pub const JITTER_EPSILON: f32 = 0.01;

/// Deterministic pseudo-random offset for the pair `(i, j)`.
///
/// Used as the separation vector when two nodes coincide. The result is
/// antisymmetric (`pair_jitter(i, j) == -pair_jitter(j, i)`) so paired forces
/// stay equal and opposite, and never zero so the direction is defined.
pub fn pair_jitter(i: usize, j: usize) -> (f32, f32) {
    let (lo, hi, sign) = if i <= j { (i, j, 1.0) } else { (j, i, -1.0) };
    let hash = splitmix64(((lo as u64) << 32) ^ hi as u64);

    // Top 24 bits select an angle on the unit circle.
    let angle = (hash >> 40) as f32 / (1u64 << 24) as f32 * std::f32::consts::TAU;
    (
        sign * JITTER_EPSILON * angle.cos(),
        sign * JITTER_EPSILON * angle.sin(),
    )
}

#[inline]
fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
