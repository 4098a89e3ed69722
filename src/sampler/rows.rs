//! Raw relationship rows, one schema per mode.
//!
//! The JSON shape is an internally tagged object:
//! `{"mode": "ownership", "rows": [{"ownerKey": "a", "itemId": 1}]}`.
//! Item ids double as node ids and are expected in `1..=N`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which relationship an edge set is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipMode {
    Ownership,
    TransferChain,
    Trait,
    Wallet,
}

impl fmt::Display for RelationshipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ownership => "ownership",
            Self::TransferChain => "transferChain",
            Self::Trait => "trait",
            Self::Wallet => "wallet",
        };
        f.write_str(name)
    }
}

/// One item held by one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRow {
    #[serde(alias = "owner")]
    pub owner_key: String,
    pub item_id: u32,
}

/// One transfer event within a chain of transfers (a wallet's or a
/// transaction batch's history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRow {
    /// Grouping key; rows without one form a single sequence.
    #[serde(default)]
    pub chain: String,
    pub item_id: u32,
    pub timestamp: i64,
}

/// One trait carried by one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitRow {
    pub item_id: u32,
    pub trait_type: String,
    pub trait_value: String,
}

/// Trade volume between two wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPair {
    pub wallet_a: String,
    pub wallet_b: String,
    pub trade_count: u32,
}

/// Per-wallet lookups: holdings, an externally computed reputation score,
/// and the wallet's rarest-trait signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletProfile {
    pub wallet: String,
    #[serde(default)]
    pub item_ids: Vec<u32>,
    #[serde(default)]
    pub reputation: Option<f32>,
    #[serde(default)]
    pub rare_traits: Vec<String>,
}

/// Input for wallet mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletRows {
    pub pairs: Vec<WalletPair>,
    pub profiles: Vec<WalletProfile>,
}

/// Rows for exactly one relationship mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RelationshipRows {
    Ownership {
        #[serde(default)]
        rows: Vec<OwnershipRow>,
    },
    TransferChain {
        #[serde(default)]
        rows: Vec<TransferRow>,
    },
    Trait {
        #[serde(default)]
        rows: Vec<TraitRow>,
    },
    Wallet(WalletRows),
}

impl RelationshipRows {
    /// The mode these rows belong to.
    pub fn mode(&self) -> RelationshipMode {
        match self {
            Self::Ownership { .. } => RelationshipMode::Ownership,
            Self::TransferChain { .. } => RelationshipMode::TransferChain,
            Self::Trait { .. } => RelationshipMode::Trait,
            Self::Wallet(_) => RelationshipMode::Wallet,
        }
    }

    /// Number of raw rows (pairs plus profiles in wallet mode).
    pub fn len(&self) -> usize {
        match self {
            Self::Ownership { rows } => rows.len(),
            Self::TransferChain { rows } => rows.len(),
            Self::Trait { rows } => rows.len(),
            Self::Wallet(w) => w.pairs.len() + w.profiles.len(),
        }
    }

    /// Check if there is nothing to sample.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
