//! R-tree wrapper for node items
//!
//! The item table is the owner; the tree stores ids plus precomputed
//! envelopes so candidate filtering stays a pure bbox affair.

use crate::geom::Shape;
use crate::item::ItemId;
use rstar::{RTreeObject, AABB};

/// Entry in the node's spatial index
#[derive(Clone, Debug)]
pub struct IndexedItem {
    pub id: ItemId,
    bounds: AABB<[f64; 2]>,
}

impl IndexedItem {
    pub fn new(id: ItemId, shape: &Shape) -> Self {
        let (min, max) = shape.bbox();
        Self {
            id,
            bounds: AABB::from_corners(min, max),
        }
    }
}

// Removal looks entries up by id; the envelope is derived state.
impl PartialEq for IndexedItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl RTreeObject for IndexedItem {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl rstar::PointDistance for IndexedItem {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.bounds.distance_2(point)
    }
}
