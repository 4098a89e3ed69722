//! Ownership mode: items held by the same owner.

use std::collections::BTreeMap;

use super::ledger::{EdgeLedger, LinkOutcome};
use super::{OwnershipRow, largest_first};
use crate::graph::DEFAULT_EDGE_WEIGHT;

/// Roughly how many edges one owner group contributes.
const SAMPLES_PER_OWNER: usize = 6;

/// Walk each owner's sorted items with stride `max(1, size / 6)`, linking
/// every stride-th item to the next stride-th one.
pub(super) fn sample(rows: &[OwnershipRow], ledger: &mut EdgeLedger) {
    let mut groups: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for row in rows.iter().filter(|r| ledger.accepts(r.item_id)) {
        groups
            .entry(row.owner_key.as_str())
            .or_default()
            .push(row.item_id);
    }

    for (_, ids) in largest_first(groups) {
        let stride = (ids.len() / SAMPLES_PER_OWNER).max(1);
        let mut i = 0;
        while i + stride < ids.len() {
            if ledger.link(ids[i], ids[i + stride], DEFAULT_EDGE_WEIGHT)
                == LinkOutcome::BudgetExhausted
            {
                return;
            }
            i += stride;
        }
    }
}
