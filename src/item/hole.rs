//! Derived drilled-hole views
//!
//! A hole is a read-only view over its parent via/solid's drill geometry.
//! It never owns the parent; the back-reference is a table handle plus the
//! parent's opaque source id, so removing the parent from a node takes its
//! holes with it.

use super::{ItemId, NetId};
use crate::geom::{Point, Shape};
use crate::layers::LayerRange;

/// Non-owning back-reference from a hole to its parent item
#[derive(Clone, Copy, Debug, Default)]
pub struct ParentRef {
    /// Parent's slot in the owning node's item table, set on insertion
    pub item: Option<ItemId>,
    /// Parent's opaque board-item reference
    pub source: Option<u64>,
}

/// Circular drilled-material region on a sub-range of the parent's layers
#[derive(Clone, Debug)]
pub struct Hole {
    pub parent: ParentRef,
    pub center: Point,
    pub radius: i64,
    pub layers: LayerRange,
    pub net: Option<NetId>,
}

impl Hole {
    pub fn shape(&self) -> Shape {
        Shape::Circle {
            center: self.center,
            radius: self.radius,
        }
    }
}
