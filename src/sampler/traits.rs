//! Trait mode: items sharing an identical trait type and value.

use std::collections::BTreeMap;

use super::{SamplerConfig, TraitRow, largest_first};
use super::ledger::EdgeLedger;
use crate::graph::DEFAULT_EDGE_WEIGHT;

/// Link consecutive members of every trait group whose size lies within
/// `trait_min_group..=trait_max_group`.
pub(super) fn sample(rows: &[TraitRow], config: &SamplerConfig, ledger: &mut EdgeLedger) {
    let mut groups: BTreeMap<(&str, &str), Vec<u32>> = BTreeMap::new();
    for row in rows.iter().filter(|r| ledger.accepts(r.item_id)) {
        groups
            .entry((row.trait_type.as_str(), row.trait_value.as_str()))
            .or_default()
            .push(row.item_id);
    }

    let informative = config.trait_min_group..=config.trait_max_group;
    for (_, ids) in largest_first(groups) {
        if !informative.contains(&ids.len()) {
            continue;
        }
        if !ledger.link_consecutive(&ids, DEFAULT_EDGE_WEIGHT) {
            return;
        }
    }
}
