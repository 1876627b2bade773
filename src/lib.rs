//! Clearance/collision resolution engine for an interactive PCB trace router
//!
//! Given a candidate routable item (track segment, via, pad/solid or drilled
//! hole), find every other item in the current board state it would illegally
//! encroach upon, under a pluggable per-layer, per-item-pair rule set.
//!
//! The engine is populated from the board by an external synchronization
//! layer and probed by the shove/routing algorithm; it has no file format or
//! UI of its own.
//!
//! # Modules
//! - `geom` - integer-coordinate shapes and signed distance kernels
//! - `layers` - normalized inclusive layer ranges
//! - `item` - the polymorphic item model (solids, segments, vias, holes)
//! - `rules` - the rule-resolver seam and the default table-driven resolver
//! - `node` - the collidable world and `query_colliding`
//! - `scan` - batch DRC passes over a whole node

pub mod geom;
pub mod item;
pub mod layers;
pub mod node;
pub mod rules;
pub mod scan;

mod width;

pub use geom::{shape_distance, Point, Shape};
pub use item::{
    Backdrill, Drill, Hole, Item, ItemId, ItemKind, MachiningMode, NetId, ParentRef, Segment,
    Solid, Via, ViaType,
};
pub use layers::{LayerId, LayerRange};
pub use node::{Collider, Node, Obstacle};
pub use rules::{classify, Constraint, ConstraintType, DesignRules, RuleOverride, RuleResolver};
pub use scan::{full_scan, targeted_scan, ClearanceViolation};
