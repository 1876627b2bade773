//! The collidable world
//!
//! A `Node` owns the current set of routable items, keeps them in an R-tree
//! for candidate filtering, and answers collision queries against a probe
//! item using an injected rule resolver. Hole views are synthesized eagerly
//! on insertion: they become table entries of their own, tied to the parent
//! through a non-owning handle and removed with it, so a query can never see
//! a stale hole.
//!
//! # Submodules
//! - `spatial` - R-tree entry type

mod spatial;

pub use spatial::IndexedItem;

use crate::geom::{shape_distance, Point};
use crate::item::{Hole, Item, ItemId};
use crate::layers::LayerRange;
use crate::rules::{classify, ConstraintType, RuleResolver};
use indexmap::IndexMap;
use rstar::{RTree, AABB};
use std::collections::HashMap;

/// Probe-side participant of a collision: either an item reference or a
/// hole view synthesized from the probe's drill geometry for this query.
#[derive(Clone, Debug)]
pub enum Collider<'a> {
    Item(&'a Item),
    Hole(Hole),
}

impl Collider<'_> {
    pub fn is_hole(&self) -> bool {
        match self {
            Collider::Hole(_) => true,
            Collider::Item(item) => item.is_hole(),
        }
    }
}

/// A reported clearance violation. Borrows into the node; any subsequent
/// mutation of the node invalidates it.
#[derive(Clone, Debug)]
pub struct Obstacle<'a> {
    /// Probe-side entity (the probe itself or one of its hole views)
    pub head: Collider<'a>,
    /// The encroached-upon item owned by the node
    pub item: &'a Item,
    pub item_id: ItemId,
    /// Resolved required clearance for the violated pair
    pub clearance: i64,
    /// Actual shape distance; negative when the shapes overlap
    pub distance: i64,
}

enum Head<'p> {
    Primary(&'p Item),
    Hole(Hole),
}

/// Collision query engine over an owned item set
pub struct Node<R> {
    rules: R,
    copper_layers: LayerRange,
    search_margin: i64,
    items: IndexMap<ItemId, Item>,
    holes_of: HashMap<ItemId, Vec<ItemId>>,
    index: RTree<IndexedItem>,
    next_id: u64,
}

impl<R: RuleResolver> Node<R> {
    /// Create an empty node. `copper_layers` is the board's valid copper
    /// span; layers outside it are never examined.
    pub fn new(rules: R, copper_layers: LayerRange) -> Self {
        // At least 1 mm of envelope expansion; resolvers that know their
        // largest clearance widen it so far violations are never filtered
        // out at the R-tree stage.
        let search_margin = rules.largest_clearance().unwrap_or(0).max(1_000_000);
        Self {
            rules,
            copper_layers,
            search_margin,
            items: IndexMap::new(),
            holes_of: HashMap::new(),
            index: RTree::new(),
            next_id: 1,
        }
    }

    /// Override the spatial search envelope expansion; must stay at least
    /// the largest clearance the resolver can return or far violations are
    /// missed.
    pub fn with_search_margin(mut self, margin: i64) -> Self {
        self.search_margin = margin;
        self
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn copper_layers(&self) -> LayerRange {
        self.copper_layers
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Items in insertion order, derived holes included
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    fn alloc_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an item, eagerly materializing hole views for its drill
    /// geometry. Returns the handle of the item itself.
    pub fn add(&mut self, item: Item) -> ItemId {
        let id = self.alloc_id();
        self.index.insert(IndexedItem::new(id, &item.shape()));
        let holes = item.holes();
        self.items.insert(id, item);

        let mut hole_ids = Vec::with_capacity(holes.len());
        for mut hole in holes {
            hole.parent.item = Some(id);
            let hole_id = self.alloc_id();
            self.index.insert(IndexedItem::new(hole_id, &hole.shape()));
            self.items.insert(hole_id, Item::Hole(hole));
            hole_ids.push(hole_id);
        }
        if !hole_ids.is_empty() {
            self.holes_of.insert(id, hole_ids);
        }
        id
    }

    /// Remove an item and any hole views derived from it
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        if let Some(hole_ids) = self.holes_of.remove(&id) {
            for hole_id in hole_ids {
                if let Some(hole) = self.items.shift_remove(&hole_id) {
                    self.index.remove(&IndexedItem::new(hole_id, &hole.shape()));
                }
            }
        }
        let item = self.items.shift_remove(&id)?;
        self.index.remove(&IndexedItem::new(id, &item.shape()));
        if let Item::Hole(h) = &item {
            if let Some(parent) = h.parent.item {
                if let Some(siblings) = self.holes_of.get_mut(&parent) {
                    siblings.retain(|hid| *hid != id);
                }
            }
        }
        Some(item)
    }

    /// Swap an item for a new one (drill changes go through here, which is
    /// what keeps hole views from ever being stale)
    pub fn replace(&mut self, id: ItemId, item: Item) -> Option<ItemId> {
        self.remove(id)?;
        Some(self.add(item))
    }

    /// Split a held segment at an interior point. Both halves are clones of
    /// the original, so the lock flag and width survive.
    pub fn split_segment(&mut self, id: ItemId, at: Point) -> Option<(ItemId, ItemId)> {
        let seg = match self.items.get(&id) {
            Some(Item::Segment(s)) => s.clone(),
            _ => return None,
        };
        let (left, right) = seg.split_at(at);
        self.remove(id);
        let left_id = self.add(Item::Segment(left));
        let right_id = self.add(Item::Segment(right));
        Some((left_id, right_id))
    }

    /// Every item the probe would illegally encroach upon.
    ///
    /// The probe's copper body and each of its hole views are tested
    /// separately, so one neighbor can legitimately yield both a copper
    /// obstacle and a hole obstacle. Copper-involved classifications report
    /// at most one obstacle per pair of parents (the worst one), no matter
    /// how many layers or orderings violate it; hole-to-hole reports per
    /// candidate drilled hole, since a parent's primary and backdrill holes
    /// are distinct entities. Result order is deterministic for a fixed
    /// node state.
    pub fn query_colliding<'a>(&'a self, probe: &'a Item) -> Vec<Obstacle<'a>> {
        if probe.layers().intersection(&self.copper_layers).is_none() {
            return Vec::new();
        }
        if self.rules.is_keepout(probe) {
            return Vec::new();
        }

        let mut heads: Vec<Head<'a>> = Vec::new();
        if probe.is_hole() || probe.collides_as_copper() {
            heads.push(Head::Primary(probe));
        }
        for hole in probe.holes() {
            heads.push(Head::Hole(hole));
        }

        // Keyed by (candidate entity, classification). Hole-to-copper keys
        // on the candidate's parent so the two orderings of one violation
        // (probe copper vs. hole, probe hole vs. copper) fuse into a single
        // obstacle; hole-to-hole keys on the hole itself, since a parent's
        // primary and backdrill holes are distinct drilled entities.
        let mut found: IndexMap<(ItemId, ConstraintType), (f64, Obstacle<'a>)> = IndexMap::new();

        for head in &heads {
            let storage;
            let head_item: &Item = match head {
                Head::Primary(item) => *item,
                Head::Hole(hole) => {
                    storage = Item::Hole(hole.clone());
                    &storage
                }
            };
            let head_shape = head_item.shape();
            let (min, max) = head_shape.bbox();
            let margin = self.search_margin as f64;
            let envelope = AABB::from_corners(
                [min[0] - margin, min[1] - margin],
                [max[0] + margin, max[1] + margin],
            );

            let mut candidate_ids: Vec<ItemId> = self
                .index
                .locate_in_envelope_intersecting(&envelope)
                .map(|entry| entry.id)
                .collect();
            candidate_ids.sort();

            for cand_id in candidate_ids {
                let Some(cand) = self.items.get(&cand_id) else {
                    continue;
                };
                if std::ptr::eq(cand as *const Item, probe as *const Item) {
                    continue;
                }
                // The probe's own derived geometry is not an obstacle
                if let (Some(a), Some(b)) = (probe.source(), cand.source()) {
                    if a == b {
                        continue;
                    }
                }
                if let Item::Hole(h) = cand {
                    if let Some(parent_id) = h.parent.item {
                        let parent_is_probe = self
                            .items
                            .get(&parent_id)
                            .is_some_and(|p| std::ptr::eq(p as *const Item, probe as *const Item));
                        if parent_is_probe {
                            continue;
                        }
                    }
                }
                // ...nor is a hole probe's own parent or a sibling hole
                if let Item::Hole(h) = probe {
                    if h.parent.item == Some(cand_id) {
                        continue;
                    }
                    if let Item::Hole(hc) = cand {
                        if h.parent.item.is_some() && h.parent.item == hc.parent.item {
                            continue;
                        }
                    }
                }
                if !cand.is_hole() && !cand.collides_as_copper() {
                    continue;
                }
                if self.rules.is_keepout(cand) {
                    continue;
                }
                if self.rules.is_net_tie_exclusion(head_item, cand) {
                    continue;
                }
                let Some(shared) = head_item.layers().intersection(&cand.layers()) else {
                    continue;
                };
                if shared.intersection(&self.copper_layers).is_none() {
                    continue;
                }

                let kind = classify(head_item, cand);
                // Copper-involved pairs on one net are connected, not
                // violations; drill-to-drill is a physical constraint and
                // stays net-independent.
                let same_net =
                    matches!((head_item.net(), cand.net()), (Some(a), Some(b)) if a == b);
                if same_net
                    && matches!(
                        kind,
                        ConstraintType::Clearance | ConstraintType::HoleClearance
                    )
                {
                    continue;
                }

                let required = self
                    .rules
                    .clearance(head_item, Some(cand), self.copper_layers, true);
                let dist = shape_distance(&head_shape, &cand.shape());
                if dist >= required as f64 {
                    continue;
                }

                let key_id = match (kind, cand) {
                    (ConstraintType::HoleToHole, _) => cand_id,
                    (_, Item::Hole(h)) => h.parent.item.unwrap_or(cand_id),
                    _ => cand_id,
                };
                let violation = required as f64 - dist;
                let obstacle = Obstacle {
                    head: match head {
                        Head::Primary(item) => Collider::Item(*item),
                        Head::Hole(hole) => Collider::Hole(hole.clone()),
                    },
                    item: cand,
                    item_id: cand_id,
                    clearance: required,
                    distance: dist.floor() as i64,
                };
                match found.get_mut(&(key_id, kind)) {
                    Some(existing) if existing.0 >= violation => {}
                    Some(existing) => *existing = (violation, obstacle),
                    None => {
                        found.insert((key_id, kind), (violation, obstacle));
                    }
                }
            }
        }

        found.into_values().map(|(_, obstacle)| obstacle).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::item::{Drill, NetId, Segment, Via, ViaType};
    use crate::rules::DesignRules;

    fn via(net: u32, x: i64, y: i64) -> Item {
        Item::Via(Via {
            source: None,
            net: Some(NetId(net)),
            layers: LayerRange::new(0, 3),
            pos: Point::new(x, y),
            diameter: 500_000,
            drill: Drill {
                diameter: 300_000,
                layers: LayerRange::new(0, 3),
            },
            backdrill: None,
            via_type: ViaType::Through,
        })
    }

    fn segment(net: u32, a: Point, b: Point, locked: bool) -> Item {
        Item::Segment(Segment {
            source: None,
            net: Some(NetId(net)),
            layers: LayerRange::single(0),
            a,
            b,
            width: 250_000,
            locked,
        })
    }

    fn node() -> Node<DesignRules> {
        Node::new(DesignRules::default(), LayerRange::new(0, 3))
    }

    #[test]
    fn test_add_materializes_holes() {
        let mut node = node();
        let id = node.add(via(1, 0, 0));
        assert_eq!(node.len(), 2);

        let holes: Vec<_> = node
            .items()
            .filter(|(_, item)| item.is_hole())
            .collect();
        assert_eq!(holes.len(), 1);
        match holes[0].1 {
            Item::Hole(h) => assert_eq!(h.parent.item, Some(id)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_remove_cascades_to_holes() {
        let mut node = node();
        let id = node.add(via(1, 0, 0));
        node.add(segment(2, Point::new(0, 0), Point::new(1_000_000, 0), false));
        assert_eq!(node.len(), 3);

        node.remove(id);
        assert_eq!(node.len(), 1);
        assert!(node.items().all(|(_, item)| !item.is_hole()));
    }

    #[test]
    fn test_split_segment_keeps_lock() {
        let mut node = node();
        let id = node.add(segment(
            1,
            Point::new(0, 0),
            Point::new(1_000_000, 0),
            true,
        ));
        let (left, right) = node.split_segment(id, Point::new(300_000, 0)).unwrap();

        assert!(node.item(id).is_none());
        for half in [left, right] {
            match node.item(half).unwrap() {
                Item::Segment(s) => {
                    assert!(s.locked);
                    assert_eq!(s.width, 250_000);
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_same_net_segments_do_not_collide() {
        let mut node = node();
        node.add(segment(1, Point::new(0, 0), Point::new(1_000_000, 0), false));
        let probe = segment(1, Point::new(0, 50_000), Point::new(1_000_000, 50_000), false);
        assert!(node.query_colliding(&probe).is_empty());

        let other_net = segment(2, Point::new(0, 50_000), Point::new(1_000_000, 50_000), false);
        assert_eq!(node.query_colliding(&other_net).len(), 1);
    }

    #[test]
    fn test_probe_outside_copper_span_sees_nothing() {
        let mut node = node();
        node.add(segment(1, Point::new(0, 0), Point::new(1_000_000, 0), false));
        let probe = Item::Segment(Segment {
            source: None,
            net: Some(NetId(2)),
            layers: LayerRange::single(9),
            a: Point::new(0, 0),
            b: Point::new(1_000_000, 0),
            width: 250_000,
            locked: false,
        });
        assert!(node.query_colliding(&probe).is_empty());
    }
}
