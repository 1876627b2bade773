//! Batch clearance scans
//!
//! Whole-board and targeted DRC passes built on top of `Node::query_colliding`.
//! Every item takes a turn as the probe in parallel; the symmetric duplicates
//! that produces are fused afterwards by unordered parent-pair and rule kind.

use crate::item::{Item, ItemId, ItemKind, NetId};
use crate::node::{Collider, Node, Obstacle};
use crate::rules::{classify, ConstraintType, RuleResolver};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Owned clearance violation record, fit for reporting/serialization
#[derive(Clone, Debug, Serialize)]
pub struct ClearanceViolation {
    /// Parent item handles (a hole reports under its parent)
    pub item_a: u64,
    pub item_b: u64,
    pub kind: ConstraintType,
    pub kind_a: ItemKind,
    pub kind_b: ItemKind,
    pub net_a: Option<NetId>,
    pub net_b: Option<NetId>,
    pub distance: i64,
    pub clearance: i64,
}

type PairKey = (u64, u64, ConstraintType);

fn parent_of(id: ItemId, item: &Item) -> ItemId {
    match item {
        Item::Hole(h) => h.parent.item.unwrap_or(id),
        _ => id,
    }
}

fn record(
    probe_id: ItemId,
    probe: &Item,
    obstacle: &Obstacle<'_>,
) -> (PairKey, ClearanceViolation) {
    let a = parent_of(probe_id, probe);
    let b = parent_of(obstacle.item_id, obstacle.item);
    let storage;
    let head_item: &Item = match &obstacle.head {
        Collider::Item(item) => item,
        Collider::Hole(hole) => {
            storage = Item::Hole(hole.clone());
            &storage
        }
    };
    let kind = classify(head_item, obstacle.item);
    let key = (a.0.min(b.0), a.0.max(b.0), kind);
    let violation = ClearanceViolation {
        item_a: a.0,
        item_b: b.0,
        kind,
        kind_a: probe.kind(),
        kind_b: obstacle.item.kind(),
        net_a: probe.net(),
        net_b: obstacle.item.net(),
        distance: obstacle.distance,
        clearance: obstacle.clearance,
    };
    (key, violation)
}

fn fuse(raw: Vec<(PairKey, ClearanceViolation)>) -> Vec<ClearanceViolation> {
    let mut seen: HashSet<PairKey> = HashSet::new();
    let mut out = Vec::new();
    for (key, violation) in raw {
        if seen.insert(key) {
            out.push(violation);
        }
    }
    out
}

/// Run a full clearance scan over every item the node holds
pub fn full_scan<R: RuleResolver + Sync>(node: &Node<R>) -> Vec<ClearanceViolation> {
    let start = std::time::Instant::now();
    let ids: Vec<ItemId> = node.items().map(|(id, _)| id).collect();

    let raw: Vec<(PairKey, ClearanceViolation)> = ids
        .par_iter()
        .flat_map(|&id| {
            let probe = match node.item(id) {
                Some(item) => item,
                None => return vec![],
            };
            node.query_colliding(probe)
                .iter()
                .map(|obstacle| record(id, probe, obstacle))
                .collect::<Vec<_>>()
        })
        .collect();

    let violations = fuse(raw);
    eprintln!(
        "[DRC] Full scan: {} items checked, {} violations found in {:?}",
        ids.len(),
        violations.len(),
        start.elapsed()
    );
    violations
}

/// Re-check just the given items against their neighbors (after an edit)
pub fn targeted_scan<R: RuleResolver + Sync>(
    node: &Node<R>,
    ids: &[ItemId],
) -> Vec<ClearanceViolation> {
    let start = std::time::Instant::now();

    let raw: Vec<(PairKey, ClearanceViolation)> = ids
        .par_iter()
        .flat_map(|&id| {
            let probe = match node.item(id) {
                Some(item) => item,
                None => return vec![],
            };
            node.query_colliding(probe)
                .iter()
                .map(|obstacle| record(id, probe, obstacle))
                .collect::<Vec<_>>()
        })
        .collect();

    let violations = fuse(raw);
    eprintln!(
        "[DRC] Targeted scan for {} items: {} violations in {:?}",
        ids.len(),
        violations.len(),
        start.elapsed()
    );
    violations
}
