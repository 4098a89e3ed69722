//! Wallet mode: holdings, trades, reputation and trait similarity.
//!
//! Runs four stages against one shared budget:
//! 1. star edges inside the wallets holding the most items
//! 2. edges between wallets that traded at least `min_trade_count` times
//! 3. lower-volume pairs where both wallets are well reputed
//! 4. Jaccard similarity of rarest-trait signatures among top holders
//!
//! A wallet appears in the graph through its representative node, the
//! smallest item id it holds.

use std::collections::{BTreeMap, BTreeSet};

use super::ledger::{EdgeLedger, LinkOutcome};
use super::{WalletPair, WalletRows, WalletSamplerConfig};
use crate::graph::DEFAULT_EDGE_WEIGHT;

/// Merged per-wallet lookups, keyed by wallet name.
#[derive(Default)]
struct WalletBook<'a> {
    holdings: BTreeMap<&'a str, Vec<u32>>,
    reputation: BTreeMap<&'a str, f32>,
    signatures: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> WalletBook<'a> {
    fn new(rows: &'a WalletRows, ledger: &EdgeLedger) -> Self {
        let mut book = Self::default();
        for profile in &rows.profiles {
            let wallet = profile.wallet.as_str();
            book.holdings.entry(wallet).or_default().extend(
                profile
                    .item_ids
                    .iter()
                    .copied()
                    .filter(|&id| ledger.accepts(id)),
            );
            if let Some(score) = profile.reputation.filter(|s| s.is_finite()) {
                book.reputation
                    .entry(wallet)
                    .and_modify(|best| *best = best.max(score))
                    .or_insert(score);
            }
            book.signatures
                .entry(wallet)
                .or_default()
                .extend(profile.rare_traits.iter().map(String::as_str));
        }
        for ids in book.holdings.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
        book
    }

    fn representative(&self, wallet: &str) -> Option<u32> {
        self.holdings.get(wallet)?.first().copied()
    }

    fn reputation(&self, wallet: &str) -> f32 {
        self.reputation.get(wallet).copied().unwrap_or(f32::NEG_INFINITY)
    }

    /// Wallets with holdings, most items first, ties by name.
    fn top_holders(&self, limit: usize) -> Vec<&'a str> {
        let mut wallets: Vec<_> = self
            .holdings
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(&wallet, ids)| (wallet, ids.len()))
            .collect();
        wallets.sort_by(|a, b| b.1.cmp(&a.1));
        wallets.into_iter().take(limit).map(|(w, _)| w).collect()
    }

    fn link_wallets(&self, a: &str, b: &str, weight: f32, ledger: &mut EdgeLedger) -> bool {
        match (self.representative(a), self.representative(b)) {
            (Some(ra), Some(rb)) => ledger.link(ra, rb, weight) != LinkOutcome::BudgetExhausted,
            _ => !ledger.is_full(),
        }
    }
}

pub(super) fn sample(rows: &WalletRows, config: &WalletSamplerConfig, ledger: &mut EdgeLedger) {
    let book = WalletBook::new(rows, ledger);

    if !star_edges(&book, config, ledger) {
        return;
    }
    if !trade_edges(&book, &rows.pairs, config, ledger) {
        return;
    }
    if !reputation_edges(&book, &rows.pairs, config, ledger) {
        return;
    }
    similarity_edges(&book, config, ledger);
}

/// Stage 1. Returns false once the budget is spent.
///
/// The hub is the wallet's representative, so a star stops at half the
/// per-node cap and leaves the rest for wallet-to-wallet edges.
fn star_edges(book: &WalletBook<'_>, config: &WalletSamplerConfig, ledger: &mut EdgeLedger) -> bool {
    let star_degree = ledger.per_node_cap() / 2;
    for wallet in book.top_holders(config.star_wallets) {
        let Some((&hub, leaves)) = book.holdings[wallet].split_first() else {
            continue;
        };
        for &leaf in leaves {
            if ledger.degree(hub) >= star_degree {
                break;
            }
            if ledger.link(hub, leaf, DEFAULT_EDGE_WEIGHT) == LinkOutcome::BudgetExhausted {
                return false;
            }
        }
    }
    !ledger.is_full()
}

/// Stage 2: busiest pairs first.
fn trade_edges(
    book: &WalletBook<'_>,
    pairs: &[WalletPair],
    config: &WalletSamplerConfig,
    ledger: &mut EdgeLedger,
) -> bool {
    let mut busy: Vec<&WalletPair> = pairs
        .iter()
        .filter(|p| p.trade_count >= config.min_trade_count)
        .collect();
    busy.sort_by(|a, b| {
        b.trade_count
            .cmp(&a.trade_count)
            .then_with(|| (&a.wallet_a, &a.wallet_b).cmp(&(&b.wallet_a, &b.wallet_b)))
    });

    busy.into_iter()
        .all(|p| book.link_wallets(&p.wallet_a, &p.wallet_b, DEFAULT_EDGE_WEIGHT, ledger))
}

/// Stage 3: pairs below the trade threshold, kept when both sides are
/// reputable. Best-reputed pairs first.
fn reputation_edges(
    book: &WalletBook<'_>,
    pairs: &[WalletPair],
    config: &WalletSamplerConfig,
    ledger: &mut EdgeLedger,
) -> bool {
    let mut reputable: Vec<(f32, &WalletPair)> = pairs
        .iter()
        .filter(|p| p.trade_count < config.min_trade_count)
        .map(|p| (book.reputation(&p.wallet_a).min(book.reputation(&p.wallet_b)), p))
        .filter(|(score, _)| *score >= config.min_reputation)
        .collect();
    reputable.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| b.1.trade_count.cmp(&a.1.trade_count))
            .then_with(|| (&a.1.wallet_a, &a.1.wallet_b).cmp(&(&b.1.wallet_a, &b.1.wallet_b)))
    });

    reputable
        .into_iter()
        .all(|(_, p)| book.link_wallets(&p.wallet_a, &p.wallet_b, DEFAULT_EDGE_WEIGHT, ledger))
}

/// Stage 4: edge weight is the similarity itself.
fn similarity_edges(
    book: &WalletBook<'_>,
    config: &WalletSamplerConfig,
    ledger: &mut EdgeLedger,
) -> bool {
    let top = book.top_holders(config.similarity_wallets);
    let empty = BTreeSet::new();
    let signature = |w: &str| book.signatures.get(w).unwrap_or(&empty);

    let mut similar = Vec::new();
    for (i, &a) in top.iter().enumerate() {
        for &b in &top[i + 1..] {
            let score = jaccard(signature(a), signature(b));
            if score > 0.0 && score >= config.min_jaccard {
                similar.push((score, a, b));
            }
        }
    }
    similar.sort_by(|x, y| y.0.total_cmp(&x.0).then_with(|| (x.1, x.2).cmp(&(y.1, y.2))));

    similar
        .into_iter()
        .all(|(score, a, b)| book.link_wallets(a, b, score, ledger))
}

/// `|A ∩ B| / |A ∪ B|`, zero when both are empty.
pub(super) fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f32 {
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f32 / union as f32
    }
}
