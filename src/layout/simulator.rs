//! Spatial-hash force simulation.
//!
//! The simulator owns all node state in Structure of Arrays (SoA) buffers and
//! advances it one tick at a time:
//!
//! 1. rebuild the [`SpatialGrid`] with cell size = repulsion radius
//! 2. inverse-square repulsion from neighbors within the radius, plus a
//!    centering pull toward the origin
//! 3. `v = (v + F / m) * damping`, then clamp `|v|` to the max speed
//! 4. spring impulses along every edge
//! 5. `x += v` (semi-implicit Euler)
//!
//! Repulsion is radius-limited rather than global, which keeps a tick close
//! to linear in node count at 10,000 nodes.
//!
//! A tick is computed into scratch buffers and swapped in only when every
//! value is finite, so a fault leaves the previous state intact.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::params::{ParamsPatch, SimulationParameters};
use crate::channel::PositionSnapshot;
use crate::error::LayoutError;
use crate::graph::{Edge, MAX_NODE_COUNT, NodeId};
use crate::spatial::{SpatialGrid, pair_jitter};

/// Squared distance below which repulsion stops growing.
const MIN_DISTANCE_SQ: f32 = 1.0;

/// Whether ticks are being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    Running,
    Paused,
}

/// A tick discarded because it produced a non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickFault {
    /// Number the tick would have had.
    pub tick: u64,
    /// First node whose state went non-finite.
    pub node: NodeId,
}

/// Counters describing a simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorStats {
    pub state: RunState,
    pub node_count: usize,
    pub edge_count: usize,
    /// Edges ignored because they reference ids outside `1..=N`, loop, or
    /// carry no usable weight.
    pub skipped_edges: usize,
    pub ticks: u64,
    pub faults: u64,
    pub snapshots: u64,
    pub epoch: u64,
}

/// Force-directed layout for one graph at a time.
pub struct ForceSimulator {
    params: SimulationParameters,
    state: RunState,

    node_count: usize,
    edges: Vec<Edge>,
    skipped_edges: usize,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,
    /// Y positions (SoA layout)
    pos_y: Vec<f32>,
    /// X velocities (SoA layout)
    vel_x: Vec<f32>,
    /// Y velocities (SoA layout)
    vel_y: Vec<f32>,
    mass: Vec<f32>,

    // Scratch buffers for the tick in progress.
    next_x: Vec<f32>,
    next_y: Vec<f32>,
    next_vx: Vec<f32>,
    next_vy: Vec<f32>,

    grid: SpatialGrid,
    rng: SmallRng,

    epoch: u64,
    ticks: u64,
    faults: u64,
    snapshots: u64,
    last_publish_ms: Option<f64>,
}

impl ForceSimulator {
    /// Create a simulator with no graph. Call [`init`](Self::init) next.
    pub fn new(params: SimulationParameters) -> Result<Self, LayoutError> {
        params.validate()?;
        Ok(Self {
            params,
            state: RunState::Running,
            node_count: 0,
            edges: Vec::new(),
            skipped_edges: 0,
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            vel_x: Vec::new(),
            vel_y: Vec::new(),
            mass: Vec::new(),
            next_x: Vec::new(),
            next_y: Vec::new(),
            next_vx: Vec::new(),
            next_vy: Vec::new(),
            grid: SpatialGrid::new(),
            rng: SmallRng::seed_from_u64(params.seed),
            epoch: 0,
            ticks: 0,
            faults: 0,
            snapshots: 0,
            last_publish_ms: None,
        })
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Load a graph of `node_count` nodes and start running.
    pub fn init(&mut self, node_count: usize, edges: Vec<Edge>) -> Result<(), LayoutError> {
        self.set_graph(node_count, edges)?;
        self.state = RunState::Running;
        Ok(())
    }

    /// Load a graph of `node_count` nodes, keeping the current run state.
    ///
    /// All node state is reallocated and positions are scattered on a disc
    /// of radius `rest_length / 2 * sqrt(N)` around the origin.
    pub fn set_graph(&mut self, node_count: usize, edges: Vec<Edge>) -> Result<(), LayoutError> {
        if node_count == 0 || node_count > MAX_NODE_COUNT {
            return Err(LayoutError::NodeCount { count: node_count });
        }

        let skipped = edges
            .iter()
            .filter(|e| e.index_pair(node_count).is_none())
            .count();
        if skipped > 0 {
            warn!(skipped, node_count, "Edges outside the node range will be ignored");
        }

        self.node_count = node_count;
        self.edges = edges;
        self.skipped_edges = skipped;
        for buffer in [
            &mut self.pos_x,
            &mut self.pos_y,
            &mut self.vel_x,
            &mut self.vel_y,
            &mut self.next_x,
            &mut self.next_y,
            &mut self.next_vx,
            &mut self.next_vy,
        ] {
            buffer.clear();
            buffer.resize(node_count, 0.0);
        }
        self.mass.clear();
        self.mass.resize(node_count, 1.0);

        self.rng = SmallRng::seed_from_u64(self.params.seed);
        self.scatter();
        self.epoch += 1;
        self.last_publish_ms = None;

        info!(
            node_count,
            edges = self.edges.len(),
            skipped,
            epoch = self.epoch,
            "Graph loaded"
        );
        Ok(())
    }

    /// Stop ticking; state is preserved exactly.
    pub fn pause(&mut self) {
        self.state = RunState::Paused;
    }

    /// Continue ticking from the preserved state.
    pub fn resume(&mut self) {
        self.state = RunState::Running;
    }

    /// Re-scatter positions and zero velocities. The graph and run state are
    /// kept; the next due check publishes immediately.
    pub fn reset(&mut self) {
        self.scatter();
        self.last_publish_ms = None;
        debug!(epoch = self.epoch, "Positions reset");
    }

    /// Merge a parameter patch, effective from the next tick.
    ///
    /// A patch carrying a new seed also reseeds placement for later resets.
    pub fn tune(&mut self, patch: &ParamsPatch) -> Result<(), LayoutError> {
        self.params.apply(patch)?;
        if let Some(seed) = patch.seed {
            self.rng = SmallRng::seed_from_u64(seed);
        }
        debug!(?patch, "Parameters tuned");
        Ok(())
    }

    /// Move one node. Non-finite coordinates and unknown ids are ignored.
    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        match id.index(self.node_count) {
            Some(i) if x.is_finite() && y.is_finite() => {
                self.pos_x[i] = x;
                self.pos_y[i] = y;
                true
            }
            _ => false,
        }
    }

    fn scatter(&mut self) {
        let radius = self.params.spring_rest_length.max(1.0) * 0.5 * (self.node_count as f32).sqrt();
        for i in 0..self.node_count {
            // sqrt keeps the density uniform over the disc.
            let r = radius * self.rng.random::<f32>().sqrt();
            let theta = self.rng.random::<f32>() * std::f32::consts::TAU;
            self.pos_x[i] = r * theta.cos();
            self.pos_y[i] = r * theta.sin();
        }
        self.vel_x.fill(0.0);
        self.vel_y.fill(0.0);
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Tick if running, then return a snapshot if one is due at `now_ms`.
    ///
    /// `now_ms` is any monotonic millisecond clock. Faulty ticks are skipped
    /// without interrupting the publish cadence.
    pub fn advance(&mut self, now_ms: f64) -> Option<PositionSnapshot> {
        if self.state != RunState::Running || self.node_count == 0 {
            return None;
        }
        // Faults are already logged and counted by tick().
        let _ = self.tick();
        self.publish_if_due(now_ms)
    }

    fn publish_if_due(&mut self, now_ms: f64) -> Option<PositionSnapshot> {
        let interval = self.params.publish_interval_ms as f64;
        let next_mark = match self.last_publish_ms {
            None => now_ms,
            Some(last) => {
                let elapsed = now_ms - last;
                if elapsed < 0.0 {
                    // Clock went backwards; restart the cadence from here.
                    self.last_publish_ms = Some(now_ms);
                    return None;
                }
                if elapsed < interval {
                    return None;
                }
                // Advance by whole intervals to hold the average rate, unless
                // we have fallen more than one interval behind.
                if elapsed >= 2.0 * interval {
                    now_ms
                } else {
                    last + interval
                }
            }
        };
        self.last_publish_ms = Some(next_mark);
        self.snapshots += 1;
        Some(self.snapshot())
    }

    /// Run one simulation step regardless of run state.
    pub fn tick(&mut self) -> Result<(), TickFault> {
        let n = self.node_count;
        if n == 0 {
            return Ok(());
        }
        let p = self.params;

        self.grid.rebuild(&self.pos_x, &self.pos_y, p.repulsion_radius);
        let radius_sq = p.repulsion_radius * p.repulsion_radius;

        for i in 0..n {
            let (xi, yi) = (self.pos_x[i], self.pos_y[i]);
            let mut fx = -xi * p.centering_coefficient;
            let mut fy = -yi * p.centering_coefficient;

            for j in self.grid.neighbors(i) {
                let mut dx = xi - self.pos_x[j];
                let mut dy = yi - self.pos_y[j];
                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq > radius_sq {
                    continue;
                }
                if dist_sq == 0.0 {
                    (dx, dy) = pair_jitter(i, j);
                    dist_sq = dx * dx + dy * dy;
                }
                let dist = dist_sq.sqrt();
                let magnitude = p.repulsion_strength / dist_sq.max(MIN_DISTANCE_SQ);
                fx += dx / dist * magnitude;
                fy += dy / dist * magnitude;
            }

            let inv_mass = 1.0 / self.mass[i];
            let mut vx = (self.vel_x[i] + fx * inv_mass) * p.damping;
            let mut vy = (self.vel_y[i] + fy * inv_mass) * p.damping;
            let speed = (vx * vx + vy * vy).sqrt();
            if speed > p.max_speed {
                let scale = p.max_speed / speed;
                vx *= scale;
                vy *= scale;
            }
            self.next_vx[i] = vx;
            self.next_vy[i] = vy;
        }

        for edge in &self.edges {
            let Some((a, b)) = edge.index_pair(n) else {
                continue;
            };
            let dx = self.pos_x[b] - self.pos_x[a];
            let dy = self.pos_y[b] - self.pos_y[a];
            let length = (dx * dx + dy * dy).sqrt();
            let (ux, uy) = if length > 0.0 {
                (dx / length, dy / length)
            } else {
                let (jx, jy) = pair_jitter(a, b);
                let norm = (jx * jx + jy * jy).sqrt();
                (jx / norm, jy / norm)
            };

            let force = p.spring_constant * edge.weight * (length - p.spring_rest_length);
            let (ix, iy) = (ux * force, uy * force);
            self.next_vx[a] += ix / self.mass[a];
            self.next_vy[a] += iy / self.mass[a];
            self.next_vx[b] -= ix / self.mass[b];
            self.next_vy[b] -= iy / self.mass[b];
        }

        let mut bad_node = None;
        for i in 0..n {
            self.next_x[i] = self.pos_x[i] + self.next_vx[i];
            self.next_y[i] = self.pos_y[i] + self.next_vy[i];
            if bad_node.is_none()
                && !(self.next_x[i].is_finite()
                    && self.next_y[i].is_finite()
                    && self.next_vx[i].is_finite()
                    && self.next_vy[i].is_finite())
            {
                bad_node = Some(i);
            }
        }

        if let Some(i) = bad_node {
            self.faults += 1;
            let fault = TickFault {
                tick: self.ticks + 1,
                node: NodeId::from_index(i),
            };
            warn!(tick = fault.tick, node = %fault.node, faults = self.faults, "Discarded non-finite tick");
            return Err(fault);
        }

        std::mem::swap(&mut self.pos_x, &mut self.next_x);
        std::mem::swap(&mut self.pos_y, &mut self.next_y);
        std::mem::swap(&mut self.vel_x, &mut self.next_vx);
        std::mem::swap(&mut self.vel_y, &mut self.next_vy);
        self.ticks += 1;
        Ok(())
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Copy of the current positions.
    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            epoch: self.epoch,
            sequence: self.snapshots,
            x: self.pos_x.clone(),
            y: self.pos_y.clone(),
        }
    }

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Get X velocities slice.
    pub fn velocities_x(&self) -> &[f32] {
        &self.vel_x
    }

    /// Get Y velocities slice.
    pub fn velocities_y(&self) -> &[f32] {
        &self.vel_y
    }

    /// Per-node masses. Every node loads with mass 1.0.
    pub fn masses(&self) -> &[f32] {
        &self.mass
    }

    /// The edge list as loaded, including skipped edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn stats(&self) -> SimulatorStats {
        SimulatorStats {
            state: self.state,
            node_count: self.node_count,
            edge_count: self.edges.len(),
            skipped_edges: self.skipped_edges,
            ticks: self.ticks,
            faults: self.faults,
            snapshots: self.snapshots,
            epoch: self.epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> ForceSimulator {
        ForceSimulator::new(SimulationParameters::default()).unwrap()
    }

    fn distance_from_origin(sim: &ForceSimulator, i: usize) -> f32 {
        sim.positions_x()[i].hypot(sim.positions_y()[i])
    }

    fn all_finite(sim: &ForceSimulator) -> bool {
        [
            sim.positions_x(),
            sim.positions_y(),
            sim.velocities_x(),
            sim.velocities_y(),
        ]
        .iter()
        .all(|buf| buf.iter().all(|v| v.is_finite()))
    }

    /// Deterministic pseudo-random edges for stress tests.
    fn scattered_edges(node_count: u32, count: u32) -> Vec<Edge> {
        (0..count)
            .map(|k| {
                let a = (k.wrapping_mul(2_654_435_761) % node_count) + 1;
                let b = (k.wrapping_mul(40_503).wrapping_add(17) % node_count) + 1;
                Edge::new(a, b, 1.0)
            })
            .collect()
    }

    #[test]
    fn test_init_rejects_bad_node_count() {
        let mut sim = simulator();
        assert!(matches!(sim.init(0, vec![]), Err(LayoutError::NodeCount { count: 0 })));
        assert!(sim.init(MAX_NODE_COUNT + 1, vec![]).is_err());
        assert!(sim.init(MAX_NODE_COUNT, vec![]).is_ok());
    }

    #[test]
    fn test_init_scatters_on_disc() {
        let mut sim = simulator();
        sim.init(100, vec![]).unwrap();
        let radius = 40.0 * 0.5 * 10.0;
        for i in 0..100 {
            assert!(distance_from_origin(&sim, i) <= radius + 1e-3);
        }
        assert!(sim.velocities_x().iter().all(|&v| v == 0.0));
        assert!(sim.masses().iter().all(|&m| m == 1.0));
        assert_eq!(sim.state(), RunState::Running);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = simulator();
        let mut b = simulator();
        a.init(50, scattered_edges(50, 60)).unwrap();
        b.init(50, scattered_edges(50, 60)).unwrap();
        for _ in 0..20 {
            a.tick().unwrap();
            b.tick().unwrap();
        }
        assert_eq!(a.positions_x(), b.positions_x());
        assert_eq!(a.positions_y(), b.positions_y());
    }

    #[test]
    fn test_four_free_nodes_settle_symmetrically() {
        let mut sim = simulator();
        sim.init(4, vec![]).unwrap();

        let mut history = vec![Vec::new(); 4];
        for tick in 0..100 {
            sim.tick().unwrap();
            if tick >= 90 {
                for (i, h) in history.iter_mut().enumerate() {
                    h.push(distance_from_origin(&sim, i));
                }
            }
        }

        for (i, h) in history.iter().enumerate() {
            let max = h.iter().copied().fold(f32::MIN, f32::max);
            let min = h.iter().copied().fold(f32::MAX, f32::min);
            let mean = h.iter().sum::<f32>() / h.len() as f32;
            assert!(
                max - min <= 0.1 * mean + 0.5,
                "node {i} still moving: {min}..{max}"
            );
        }

        // All four end up the same distance out.
        let radii: Vec<f32> = (0..4).map(|i| distance_from_origin(&sim, i)).collect();
        let mean = radii.iter().sum::<f32>() / 4.0;
        let spread = radii.iter().copied().fold(f32::MIN, f32::max)
            - radii.iter().copied().fold(f32::MAX, f32::min);
        assert!(spread <= 0.1 * mean, "uneven distances {radii:?}");

        let cx: f32 = sim.positions_x().iter().sum::<f32>() / 4.0;
        let cy: f32 = sim.positions_y().iter().sum::<f32>() / 4.0;
        assert!(cx.hypot(cy) < 1.0, "centroid drifted to ({cx}, {cy})");
    }

    #[test]
    fn test_spring_pair_and_free_node() {
        let mut sim = simulator();
        sim.init(3, vec![Edge::new(1, 2, 1.0)]).unwrap();
        for _ in 0..300 {
            sim.tick().unwrap();
        }

        let rest = sim.params().spring_rest_length;
        let (x, y) = (sim.positions_x(), sim.positions_y());
        let pair = (x[0] - x[1]).hypot(y[0] - y[1]);
        assert!(
            pair > 0.5 * rest && pair < 2.0 * rest,
            "pair distance {pair} not near rest length {rest}"
        );
        assert!(distance_from_origin(&sim, 2) < sim.params().repulsion_radius);
    }

    #[test]
    fn test_large_graph_stays_finite() {
        let mut sim = simulator();
        sim.init(2_000, scattered_edges(2_000, 500)).unwrap();
        for _ in 0..50 {
            sim.tick().unwrap();
        }
        assert!(all_finite(&sim));

        let mut sim = simulator();
        sim.init(MAX_NODE_COUNT, scattered_edges(MAX_NODE_COUNT as u32, 500)).unwrap();
        for _ in 0..3 {
            sim.tick().unwrap();
        }
        assert!(all_finite(&sim));
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut sim = simulator();
        sim.init(2, vec![]).unwrap();
        sim.set_position(NodeId(1), 0.0, 0.0);
        sim.set_position(NodeId(2), 0.5, 0.0);
        sim.tick().unwrap();

        let max = sim.params().max_speed;
        for i in 0..2 {
            let speed = sim.velocities_x()[i].hypot(sim.velocities_y()[i]);
            assert!(speed <= max * 1.0001, "speed {speed} over clamp {max}");
        }
    }

    #[test]
    fn test_coincident_nodes_separate() {
        let mut sim = simulator();
        sim.init(2, vec![Edge::new(1, 2, 1.0)]).unwrap();
        sim.set_position(NodeId(1), 5.0, 5.0);
        sim.set_position(NodeId(2), 5.0, 5.0);
        sim.tick().unwrap();

        assert!(all_finite(&sim));
        let (x, y) = (sim.positions_x(), sim.positions_y());
        assert!((x[0] - x[1]).hypot(y[0] - y[1]) > 0.0);
    }

    #[test]
    fn test_out_of_range_edges_skipped() {
        let mut sim = simulator();
        let edges = vec![
            Edge::new(1, 5, 1.0),
            Edge::new(0, 1, 1.0),
            Edge::new(2, 2, 1.0),
            Edge::new(1, 2, 1.0),
        ];
        sim.init(3, edges).unwrap();
        assert_eq!(sim.stats().skipped_edges, 3);
        assert_eq!(sim.stats().edge_count, 4);
        for _ in 0..10 {
            sim.tick().unwrap();
        }
        assert!(all_finite(&sim));
    }

    #[test]
    fn test_faulty_tick_is_discarded() {
        let mut sim = simulator();
        sim.init(2, vec![Edge::new(1, 2, 1.0)]).unwrap();
        sim.set_position(NodeId(1), f32::MAX, 0.0);
        sim.set_position(NodeId(2), -f32::MAX, 0.0);
        let before = (sim.positions_x().to_vec(), sim.velocities_x().to_vec());

        let fault = sim.tick().unwrap_err();
        assert_eq!(fault.tick, 1);
        assert_eq!(sim.stats().faults, 1);
        assert_eq!(sim.stats().ticks, 0);
        assert_eq!((sim.positions_x().to_vec(), sim.velocities_x().to_vec()), before);

        // The publish stream keeps going.
        assert!(sim.advance(0.0).is_some());
        assert_eq!(sim.stats().faults, 2);
    }

    #[test]
    fn test_pause_resume_preserves_state() {
        let mut sim = simulator();
        sim.init(20, scattered_edges(20, 15)).unwrap();
        for step in 0..10 {
            sim.advance(step as f64 * 16.0);
        }

        sim.pause();
        let frozen = (
            sim.positions_x().to_vec(),
            sim.positions_y().to_vec(),
            sim.velocities_x().to_vec(),
            sim.velocities_y().to_vec(),
        );
        for step in 10..50 {
            assert!(sim.advance(step as f64 * 16.0).is_none());
        }
        let after_pause = (
            sim.positions_x().to_vec(),
            sim.positions_y().to_vec(),
            sim.velocities_x().to_vec(),
            sim.velocities_y().to_vec(),
        );
        assert_eq!(frozen, after_pause);

        sim.resume();
        sim.advance(50.0 * 16.0);
        assert_ne!(sim.positions_x(), &frozen.0[..]);
    }

    #[test]
    fn test_reset_keeps_graph() {
        let mut sim = simulator();
        let edges = scattered_edges(30, 20);
        sim.init(30, edges.clone()).unwrap();
        for _ in 0..5 {
            sim.tick().unwrap();
        }
        sim.pause();
        let before = sim.positions_x().to_vec();

        sim.reset();
        assert_ne!(sim.positions_x(), &before[..]);
        assert_eq!(sim.node_count(), 30);
        assert_eq!(sim.edges(), &edges[..]);
        assert_eq!(sim.state(), RunState::Paused);
        assert!(sim.velocities_x().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_set_graph_keeps_run_state() {
        let mut sim = simulator();
        sim.init(5, vec![]).unwrap();
        sim.pause();
        sim.set_graph(8, vec![Edge::new(1, 8, 1.0)]).unwrap();
        assert_eq!(sim.state(), RunState::Paused);
        assert_eq!(sim.node_count(), 8);
        assert_eq!(sim.stats().epoch, 2);
    }

    #[test]
    fn test_tune_takes_effect_next_tick() {
        let mut a = simulator();
        let mut b = simulator();
        a.init(10, scattered_edges(10, 8)).unwrap();
        b.init(10, scattered_edges(10, 8)).unwrap();
        for _ in 0..20 {
            a.tick().unwrap();
            b.tick().unwrap();
        }

        let patch = ParamsPatch {
            damping: Some(0.5),
            ..Default::default()
        };
        a.tune(&patch).unwrap();
        assert_eq!(a.positions_x(), b.positions_x());
        assert_eq!(a.params().damping, 0.5);

        a.tick().unwrap();
        b.tick().unwrap();
        assert_ne!(a.velocities_x(), b.velocities_x());
    }

    #[test]
    fn test_rejected_tune_keeps_params() {
        let mut sim = simulator();
        let patch = ParamsPatch {
            repulsion_radius: Some(-1.0),
            ..Default::default()
        };
        assert!(sim.tune(&patch).is_err());
        assert_eq!(*sim.params(), SimulationParameters::default());
    }

    #[test]
    fn test_publish_cadence_matches_interval() {
        let mut sim = simulator();
        sim.init(10, vec![]).unwrap();

        // One simulated second at 16 ms ticks.
        let published = (0..63)
            .filter_map(|step| sim.advance(step as f64 * 16.0))
            .count();
        assert!((24..=36).contains(&published), "{published} snapshots in 1s");
    }

    #[test]
    fn test_snapshots_are_numbered_copies() {
        let mut sim = simulator();
        sim.init(3, vec![]).unwrap();
        let first = sim.advance(0.0).unwrap();
        let second = sim.advance(100.0).unwrap();
        assert_eq!(first.sequence + 1, second.sequence);
        assert_eq!(first.epoch, 1);
        assert_eq!(second.x, sim.positions_x());
    }

    #[test]
    fn test_empty_simulator_is_inert() {
        let mut sim = simulator();
        assert!(sim.tick().is_ok());
        assert!(sim.advance(0.0).is_none());
        assert!(!sim.set_position(NodeId(1), 0.0, 0.0));
    }
}
