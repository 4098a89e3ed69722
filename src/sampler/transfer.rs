//! Transfer-chain mode: items moved one after another in the same chain.

use std::collections::BTreeMap;

use super::TransferRow;
use super::ledger::{EdgeLedger, LinkOutcome};
use crate::graph::DEFAULT_EDGE_WEIGHT;

/// Order each chain by time and link consecutive events of different items.
/// Longer chains go first.
pub(super) fn sample(rows: &[TransferRow], ledger: &mut EdgeLedger) {
    let mut chains: BTreeMap<&str, Vec<(i64, u32)>> = BTreeMap::new();
    for row in rows.iter().filter(|r| ledger.accepts(r.item_id)) {
        chains
            .entry(row.chain.as_str())
            .or_default()
            .push((row.timestamp, row.item_id));
    }

    let mut ordered: Vec<_> = chains.into_values().collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()));

    for mut events in ordered {
        events.sort_unstable();
        for pair in events.windows(2) {
            let (from, to) = (pair[0].1, pair[1].1);
            if from != to && ledger.link(from, to, DEFAULT_EDGE_WEIGHT) == LinkOutcome::BudgetExhausted {
                return;
            }
        }
    }
}
