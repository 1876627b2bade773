//! Routable item model
//!
//! Items are a tagged union over the four routable kinds. Kind-specific data
//! lives in per-variant structs; the enum provides the shared accessors
//! (layer range, net, collision shape) the collision engine works against.
//!
//! # Submodules
//! - `segment` - track segments and the clone-based split
//! - `via` - vias with primary drill and optional backdrill
//! - `solid` - pads, planes and board-edge geometry
//! - `hole` - derived drilled-hole views

mod hole;
mod segment;
mod solid;
mod via;

pub use hole::{Hole, ParentRef};
pub use segment::Segment;
pub use solid::Solid;
pub use via::{Backdrill, Drill, MachiningMode, Via, ViaType};

use crate::geom::{Point, Shape};
use crate::layers::LayerRange;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Opaque, comparable net identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub u32);

/// Handle to an item owned by a `Node`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ItemKind {
    Solid,
    Segment,
    Via,
    Hole,
}

/// A routable/collidable item
#[derive(Clone, Debug)]
pub enum Item {
    Solid(Solid),
    Segment(Segment),
    Via(Via),
    Hole(Hole),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Solid(_) => ItemKind::Solid,
            Item::Segment(_) => ItemKind::Segment,
            Item::Via(_) => ItemKind::Via,
            Item::Hole(_) => ItemKind::Hole,
        }
    }

    pub fn layers(&self) -> LayerRange {
        match self {
            Item::Solid(s) => s.layers,
            Item::Segment(s) => s.layers,
            Item::Via(v) => v.layers,
            Item::Hole(h) => h.layers,
        }
    }

    pub fn net(&self) -> Option<NetId> {
        match self {
            Item::Solid(s) => s.net,
            Item::Segment(s) => s.net,
            Item::Via(v) => v.net,
            Item::Hole(h) => h.net,
        }
    }

    /// Opaque board-item reference, used only for result reporting and for
    /// excluding an item's own derived geometry from queries against it.
    pub fn source(&self) -> Option<u64> {
        match self {
            Item::Solid(s) => s.source,
            Item::Segment(s) => s.source,
            Item::Via(v) => v.source,
            Item::Hole(h) => h.parent.source,
        }
    }

    /// Collision shape; borrowed for solids, synthesized for the rest
    pub fn shape(&self) -> Cow<'_, Shape> {
        match self {
            Item::Solid(s) => Cow::Borrowed(&s.shape),
            Item::Segment(s) => Cow::Owned(s.shape()),
            Item::Via(v) => Cow::Owned(v.shape()),
            Item::Hole(h) => Cow::Owned(h.shape()),
        }
    }

    /// Reference position: pad/via center, segment midpoint, hole center
    pub fn anchor(&self) -> Point {
        match self {
            Item::Solid(s) => s.pos,
            Item::Segment(s) => Point::new((s.a.x + s.b.x) / 2, (s.a.y + s.b.y) / 2),
            Item::Via(v) => v.pos,
            Item::Hole(h) => h.center,
        }
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Item::Hole(_))
    }

    /// Board-outline/margin geometry, subject to edge clearance
    pub fn is_edge(&self) -> bool {
        matches!(self, Item::Solid(s) if s.edge)
    }

    /// Whether the item participates in copper clearance checks. Aperture
    /// pads and copperless NPTH solids carry no copper; holes collide as
    /// holes, never as copper.
    pub fn collides_as_copper(&self) -> bool {
        match self {
            Item::Solid(s) => !s.aperture && !s.copperless,
            Item::Segment(_) | Item::Via(_) => true,
            Item::Hole(_) => false,
        }
    }

    /// Drilled-hole views derived from this item's drill geometry, clamped
    /// to the item's copper layer range. Empty for undrilled items.
    pub fn holes(&self) -> Vec<Hole> {
        match self {
            Item::Via(v) => v.holes(),
            Item::Solid(s) => s.holes(),
            _ => Vec::new(),
        }
    }
}
