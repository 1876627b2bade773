//! Solids: pads, plane fragments, board-edge geometry

use super::{Drill, Hole, NetId, ParentRef};
use crate::geom::{Point, Shape};
use crate::layers::LayerRange;

/// A solid copper (or copper-less) region
#[derive(Clone, Debug)]
pub struct Solid {
    pub source: Option<u64>,
    pub net: Option<NetId>,
    pub layers: LayerRange,
    /// Anchor position (pad center); the shape is in absolute coordinates
    pub pos: Point,
    pub shape: Shape,
    /// Aperture pad: not collidable for copper purposes
    pub aperture: bool,
    /// NPTH pad with no copper of its own
    pub copperless: bool,
    /// Board-outline/margin geometry, checked under edge clearance
    pub edge: bool,
    pub drill: Option<Drill>,
}

impl Solid {
    /// Drilled-hole view for an NPTH/PTH pad, clamped to the pad's layer
    /// span. Copperless pads drill plain board material, so their hole
    /// carries no net.
    pub fn holes(&self) -> Vec<Hole> {
        let Some(drill) = &self.drill else {
            return Vec::new();
        };
        let Some(layers) = drill.layers.intersection(&self.layers) else {
            return Vec::new();
        };
        vec![Hole {
            parent: ParentRef {
                item: None,
                source: self.source,
            },
            center: self.pos,
            radius: drill.diameter / 2,
            layers,
            net: if self.copperless { None } else { self.net },
        }]
    }
}
