//! Edge sampling: raw relationship rows to a bounded, legible edge list.
//!
//! Every mode follows the same rules:
//! - at most `edge_budget` edges (never more than [`MAX_EDGE_BUDGET`])
//! - no node incident to more than `per_node_cap` edges
//! - ids outside `1..=N`, self-pairs and repeated pairs are dropped
//! - groups are processed largest first, ties broken by key, so identical
//!   input always yields identical output
//!
//! Empty input yields an empty list; sampling never fails.

mod ledger;
mod ownership;
mod rows;
mod traits;
mod transfer;
mod wallet;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LayoutError;
use crate::graph::Edge;

pub use ledger::{EdgeLedger, LinkOutcome};
pub use rows::{
    OwnershipRow, RelationshipMode, RelationshipRows, TraitRow, TransferRow, WalletPair,
    WalletProfile, WalletRows,
};

/// Hard upper bound on the edge budget.
pub const MAX_EDGE_BUDGET: usize = 500;

/// Sampling limits and per-mode thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplerConfig {
    /// Maximum edges returned, clamped to `0..=500` (default: 500).
    pub edge_budget: usize,
    /// Maximum sampled edges touching one node (default: 6).
    pub per_node_cap: usize,
    /// Trait groups smaller than this are noise (default: 3).
    pub trait_min_group: usize,
    /// Trait groups larger than this are uninformative (default: 40).
    pub trait_max_group: usize,
    /// Wallet-mode thresholds.
    pub wallet: WalletSamplerConfig,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            edge_budget: MAX_EDGE_BUDGET,
            per_node_cap: 6,
            trait_min_group: 3,
            trait_max_group: 40,
            wallet: WalletSamplerConfig::default(),
        }
    }
}

impl SamplerConfig {
    /// The budget actually enforced.
    pub fn effective_budget(&self) -> usize {
        self.edge_budget.min(MAX_EDGE_BUDGET)
    }

    /// Check thresholds are finite and ordered.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.trait_min_group > self.trait_max_group {
            return Err(LayoutError::InvalidParameter {
                name: "traitMinGroup",
                reason: "must not exceed traitMaxGroup",
            });
        }
        let jaccard = self.wallet.min_jaccard;
        if !(jaccard.is_finite() && (0.0..=1.0).contains(&jaccard)) {
            return Err(LayoutError::InvalidParameter {
                name: "minJaccard",
                reason: "must be within 0..=1",
            });
        }
        if !self.wallet.min_reputation.is_finite() {
            return Err(LayoutError::InvalidParameter {
                name: "minReputation",
                reason: "must be finite",
            });
        }
        Ok(())
    }
}

/// Heuristic wallet-mode thresholds. These are tuning values, not derived
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletSamplerConfig {
    /// Wallets (by holdings) that get intra-wallet star edges (default: 10).
    pub star_wallets: usize,
    /// Trades needed for a wallet-pair edge (default: 2).
    pub min_trade_count: u32,
    /// Reputation both wallets need for a low-volume pair edge (default: 0.8).
    pub min_reputation: f32,
    /// Wallets (by holdings) compared for trait similarity (default: 50).
    pub similarity_wallets: usize,
    /// Jaccard index needed for a similarity edge (default: 0.15).
    pub min_jaccard: f32,
}

impl Default for WalletSamplerConfig {
    fn default() -> Self {
        Self {
            star_wallets: 10,
            min_trade_count: 2,
            min_reputation: 0.8,
            similarity_wallets: 50,
            min_jaccard: 0.15,
        }
    }
}

/// Samples edges according to a [`SamplerConfig`].
#[derive(Debug, Clone, Default)]
pub struct EdgeSampler {
    config: SamplerConfig,
}

impl EdgeSampler {
    /// Create a sampler with the given limits.
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// The sampler's configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Build the edge list for `rows` over nodes `1..=node_count`.
    pub fn sample(&self, rows: &RelationshipRows, node_count: usize) -> Vec<Edge> {
        let mut ledger = EdgeLedger::new(
            node_count,
            self.config.effective_budget(),
            self.config.per_node_cap,
        );

        if !rows.is_empty() && !ledger.is_full() {
            match rows {
                RelationshipRows::Ownership { rows } => ownership::sample(rows, &mut ledger),
                RelationshipRows::TransferChain { rows } => transfer::sample(rows, &mut ledger),
                RelationshipRows::Trait { rows } => traits::sample(rows, &self.config, &mut ledger),
                RelationshipRows::Wallet(wallet) => {
                    wallet::sample(wallet, &self.config.wallet, &mut ledger)
                }
            }
        }

        debug!(
            mode = %rows.mode(),
            rows = rows.len(),
            node_count,
            edges = ledger.len(),
            rejected = ledger.rejected(),
            "Sampled edges"
        );
        ledger.into_edges()
    }
}

/// Sample with default thresholds and the given budget and cap.
pub fn sample(
    rows: &RelationshipRows,
    node_count: usize,
    edge_budget: usize,
    per_node_cap: usize,
) -> Vec<Edge> {
    EdgeSampler::new(SamplerConfig {
        edge_budget,
        per_node_cap,
        ..Default::default()
    })
    .sample(rows, node_count)
}

/// Sort and dedupe each group's ids, then order groups by descending size.
/// Ties keep the map's key order.
fn largest_first<K: Ord>(groups: BTreeMap<K, Vec<u32>>) -> Vec<(K, Vec<u32>)> {
    let mut ordered: Vec<_> = groups
        .into_iter()
        .map(|(key, mut ids)| {
            ids.sort_unstable();
            ids.dedup();
            (key, ids)
        })
        .collect();
    ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    ordered
}
