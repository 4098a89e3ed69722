//! relgraph-layout - WASM Module
//!
//! Edge sampling and force-directed layout for relationship graphs. The
//! crate compiles both natively and to WebAssembly; the wasm build exposes a
//! JavaScript-friendly API via wasm-bindgen for hosting inside a Web Worker.
//!
//! # Architecture
//!
//! - `sampler`: Turns relationship rows into a bounded, legible edge list
//! - `spatial`: Uniform hash grid for repulsion, R-tree for hit testing
//! - `layout`: Force simulator with throttled snapshot publishing
//! - `channel`: Latest-value position channel between simulator and consumers
//! - `runtime`: Native tokio host for the simulator (not built for wasm32)

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod channel;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
#[cfg(not(target_arch = "wasm32"))]
pub mod runtime;
pub mod sampler;
pub mod spatial;

use channel::PositionSnapshot;
use config::LayoutConfig;
use graph::{edges_from_triples, edges_to_triples};
use layout::{ForceSimulator, ParamsPatch};
use sampler::{EdgeSampler, RelationshipRows};
use spatial::SnapshotIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the layout engine.
///
/// Owns one sampler and one simulator. The host drives time by calling
/// `advance` from its own timer; positions are always handed out as copies.
#[wasm_bindgen]
pub struct LayoutEngineWasm {
    sampler: EdgeSampler,
    simulator: ForceSimulator,
    latest: Option<PositionSnapshot>,
    index: Option<SnapshotIndex>,
}

#[wasm_bindgen]
impl LayoutEngineWasm {
    /// Create an engine from a config object; `undefined` uses defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<LayoutEngineWasm, JsError> {
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate()?;

        Ok(Self {
            sampler: EdgeSampler::new(config.sampler),
            simulator: ForceSimulator::new(config.simulation)?,
            latest: None,
            index: None,
        })
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Sample edges from tagged relationship rows.
    ///
    /// Returns flat `[src0, tgt0, w0, ...]` triples ready for `init`.
    #[wasm_bindgen(js_name = sampleEdges)]
    pub fn sample_edges(&self, rows: JsValue, node_count: usize) -> Result<Vec<f32>, JsError> {
        let rows: RelationshipRows = serde_wasm_bindgen::from_value(rows)?;
        Ok(edges_to_triples(&self.sampler.sample(&rows, node_count)))
    }

    // =========================================================================
    // Simulation Control
    // =========================================================================

    /// Load a graph and start running.
    pub fn init(&mut self, node_count: usize, edges: &[f32]) -> Result<(), JsError> {
        self.simulator.init(node_count, edges_from_triples(edges))?;
        self.clear_published();
        Ok(())
    }

    /// Load a graph without changing the run state.
    #[wasm_bindgen(js_name = setGraph)]
    pub fn set_graph(&mut self, node_count: usize, edges: &[f32]) -> Result<(), JsError> {
        self.simulator.set_graph(node_count, edges_from_triples(edges))?;
        self.clear_published();
        Ok(())
    }

    pub fn pause(&mut self) {
        self.simulator.pause();
    }

    pub fn resume(&mut self) {
        self.simulator.resume();
    }

    pub fn reset(&mut self) {
        self.simulator.reset();
    }

    /// Merge a partial parameter object. Invalid patches change nothing.
    pub fn tune(&mut self, patch: JsValue) -> Result<(), JsError> {
        let patch: ParamsPatch = serde_wasm_bindgen::from_value(patch)?;
        self.simulator.tune(&patch)?;
        Ok(())
    }

    /// Step the simulation to `now_ms`.
    ///
    /// Returns true when a new snapshot was published.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        match self.simulator.advance(now_ms) {
            Some(snapshot) => {
                self.latest = Some(snapshot);
                self.index = None;
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.simulator.is_running()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.simulator.node_count()
    }

    /// Simulator counters as a plain object.
    pub fn stats(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.simulator.stats())?)
    }

    // =========================================================================
    // Published Positions (Copies)
    // =========================================================================

    /// X positions from the latest snapshot.
    #[wasm_bindgen(js_name = positionsX)]
    pub fn positions_x(&self) -> Float32Array {
        match &self.latest {
            Some(snapshot) => Float32Array::from(&snapshot.x[..]),
            None => Float32Array::from(self.simulator.positions_x()),
        }
    }

    /// Y positions from the latest snapshot.
    #[wasm_bindgen(js_name = positionsY)]
    pub fn positions_y(&self) -> Float32Array {
        match &self.latest {
            Some(snapshot) => Float32Array::from(&snapshot.y[..]),
            None => Float32Array::from(self.simulator.positions_y()),
        }
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the node nearest to a point in the latest snapshot.
    ///
    /// Returns the node ID, or None if no node is within `max_distance`.
    #[wasm_bindgen(js_name = pickNode)]
    pub fn pick_node(&mut self, x: f32, y: f32, max_distance: f32) -> Option<u32> {
        self.snapshot_index()?
            .nearest_within(x, y, max_distance)
            .map(|id| id.raw())
    }

    /// Find all nodes within a rectangular region of the latest snapshot.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<u32> {
        self.snapshot_index()
            .map(|index| {
                index
                    .in_rect(min_x, min_y, max_x, max_y)
                    .into_iter()
                    .map(|id| id.raw())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find all nodes within `radius` of a point in the latest snapshot.
    #[wasm_bindgen(js_name = nodesInRadius)]
    pub fn nodes_in_radius(&mut self, x: f32, y: f32, radius: f32) -> Vec<u32> {
        self.snapshot_index()
            .map(|index| {
                index
                    .in_radius(x, y, radius)
                    .into_iter()
                    .map(|id| id.raw())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl LayoutEngineWasm {
    fn clear_published(&mut self) {
        self.latest = None;
        self.index = None;
    }

    fn snapshot_index(&mut self) -> Option<&SnapshotIndex> {
        let snapshot = self.latest.as_ref()?;
        if !self.index.as_ref().is_some_and(|index| index.matches(snapshot)) {
            self.index = Some(SnapshotIndex::from_snapshot(snapshot));
        }
        self.index.as_ref()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::graph::{Edge, NodeId};
    use crate::sampler::{OwnershipRow, TraitRow, WalletPair, WalletProfile, WalletRows};

    fn all_finite(sim: &ForceSimulator) -> bool {
        sim.positions_x()
            .iter()
            .chain(sim.positions_y())
            .chain(sim.velocities_x())
            .chain(sim.velocities_y())
            .all(|v| v.is_finite())
    }

    /// Sample ownership edges, lay them out, and pick a node from the result.
    #[test]
    fn test_ownership_sample_to_layout() {
        let node_count = 300;
        let rows = RelationshipRows::Ownership {
            rows: (1..=node_count as u32)
                .map(|item_id| OwnershipRow {
                    owner_key: format!("owner-{}", item_id % 7),
                    item_id,
                })
                .collect(),
        };

        let config = LayoutConfig::default();
        let edges = EdgeSampler::new(config.sampler).sample(&rows, node_count);
        assert!(!edges.is_empty());
        assert!(edges.len() <= 500);

        let mut sim = ForceSimulator::new(config.simulation).unwrap();
        sim.init(node_count, edges.clone()).unwrap();
        assert_eq!(sim.stats().skipped_edges, 0);

        let mut published = None;
        for step in 1..=300 {
            if let Some(snapshot) = sim.advance(step as f64 * 16.0) {
                published = Some(snapshot);
            }
        }
        assert!(all_finite(&sim));
        assert_eq!(sim.stats().faults, 0);

        let snapshot = published.expect("running simulator publishes");
        assert_eq!(snapshot.len(), node_count);

        let index = SnapshotIndex::from_snapshot(&snapshot);
        let target = NodeId::new(42);
        let (x, y) = snapshot.position(target).unwrap();
        assert_eq!(index.nearest_within(x, y, 0.5), Some(target));
    }

    /// Edges survive the flat triple encoding used across the wasm boundary.
    #[test]
    fn test_triples_into_simulator() {
        let edges = vec![Edge::new(1, 2, 1.0), Edge::new(2, 3, 0.5), Edge::new(3, 9, 1.0)];
        let flat = edges_to_triples(&edges);

        let mut sim = ForceSimulator::new(Default::default()).unwrap();
        sim.init(5, edges_from_triples(&flat)).unwrap();

        let stats = sim.stats();
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.skipped_edges, 1);
    }

    /// A JSON config drives both halves of the pipeline.
    #[test]
    fn test_config_drives_sampler_and_simulator() {
        let config = LayoutConfig::from_json(
            r#"{
                "sampler": { "edgeBudget": 12, "perNodeCap": 2 },
                "simulation": { "damping": 0.7, "publishIntervalMs": 100 }
            }"#,
        )
        .unwrap();

        let rows = RelationshipRows::Trait {
            rows: (1..=30u32)
                .map(|item_id| TraitRow {
                    item_id,
                    trait_type: "Background".into(),
                    trait_value: format!("v{}", item_id % 3),
                })
                .collect(),
        };
        let edges = EdgeSampler::new(config.sampler).sample(&rows, 30);
        assert!(edges.len() <= 12);

        let mut sim = ForceSimulator::new(config.simulation).unwrap();
        sim.init(30, edges).unwrap();

        let published = (1..=63)
            .filter_map(|step| sim.advance(step as f64 * 16.0))
            .count();
        assert!((9..=11).contains(&published), "{published} snapshots in ~1s");
    }

    /// Hit tests on the engine answer from the latest published snapshot.
    #[test]
    fn test_engine_hit_tests_follow_snapshot() {
        let mut engine = LayoutEngineWasm {
            sampler: EdgeSampler::default(),
            simulator: ForceSimulator::new(Default::default()).unwrap(),
            latest: None,
            index: None,
        };
        assert!(engine.init(6, &[1.0, 2.0, 1.0, 2.0, 3.0, 1.0]).is_ok());
        assert_eq!(engine.pick_node(0.0, 0.0, 1_000.0), None);

        assert!(engine.advance(0.0));
        let snapshot = engine.latest.clone().unwrap();
        let (x, y) = snapshot.position(NodeId::new(4)).unwrap();

        assert_eq!(engine.pick_node(x, y, 0.5), Some(4));
        assert!(engine.nodes_in_radius(x, y, 0.5).contains(&4));
        assert_eq!(engine.nodes_in_radius(x, y, 10_000.0).len(), 6);
        assert_eq!(engine.nodes_in_rect(-1e4, -1e4, 1e4, 1e4).len(), 6);
    }

    /// Wallet rows produce weighted edges that settle without faults.
    #[test]
    fn test_wallet_sample_to_layout() {
        let profiles = (0..8u32)
            .map(|w| WalletProfile {
                wallet: format!("0x{w:02}"),
                item_ids: (1..=10).map(|k| w * 10 + k).collect(),
                reputation: Some(0.9),
                rare_traits: vec![format!("trait-{}", w % 2), "shared".into()],
            })
            .collect();
        let pairs = (0..7u32)
            .map(|w| WalletPair {
                wallet_a: format!("0x{w:02}"),
                wallet_b: format!("0x{:02}", w + 1),
                trade_count: 3,
            })
            .collect();
        let rows = RelationshipRows::Wallet(WalletRows { pairs, profiles });

        let edges = sampler::sample(&rows, 80, 200, 6);
        assert!(!edges.is_empty());
        assert!(edges.iter().all(|e| e.weight > 0.0 && e.weight <= 1.0));

        let mut sim = ForceSimulator::new(Default::default()).unwrap();
        sim.init(80, edges).unwrap();
        for _ in 0..200 {
            sim.tick().unwrap();
        }
        assert!(all_finite(&sim));
    }
}
