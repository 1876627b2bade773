//! Vias: copper barrel, primary drill, optional backdrill

use super::{Hole, NetId, ParentRef};
use crate::geom::{Point, Shape};
use crate::layers::LayerRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViaType {
    Through,
    Blind,
    Buried,
    Micro,
}

/// Post-machining applied after a secondary drill pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachiningMode {
    None,
    Countersink,
    Counterbore,
}

/// A drill operation: diameter plus the layer span it removes material from
#[derive(Clone, Copy, Debug)]
pub struct Drill {
    pub diameter: i64,
    pub layers: LayerRange,
}

/// Secondary, larger-diameter drill removing part of the hole stack
#[derive(Clone, Copy, Debug)]
pub struct Backdrill {
    pub diameter: i64,
    pub layers: LayerRange,
    pub machining: MachiningMode,
}

#[derive(Clone, Debug)]
pub struct Via {
    pub source: Option<u64>,
    pub net: Option<NetId>,
    /// Copper layer span of the barrel
    pub layers: LayerRange,
    pub pos: Point,
    pub diameter: i64,
    pub drill: Drill,
    pub backdrill: Option<Backdrill>,
    pub via_type: ViaType,
}

impl Via {
    pub fn shape(&self) -> Shape {
        Shape::Circle {
            center: self.pos,
            radius: self.diameter / 2,
        }
    }

    /// Drilled-hole views for the primary drill and, if present, the
    /// backdrill. Hole ranges are clamped to the barrel's copper span; a
    /// drill that misses the span entirely yields no view.
    pub fn holes(&self) -> Vec<Hole> {
        let mut out = Vec::new();
        if let Some(layers) = self.drill.layers.intersection(&self.layers) {
            out.push(Hole {
                parent: ParentRef {
                    item: None,
                    source: self.source,
                },
                center: self.pos,
                radius: self.drill.diameter / 2,
                layers,
                net: self.net,
            });
        }
        if let Some(bd) = &self.backdrill {
            if let Some(layers) = bd.layers.intersection(&self.layers) {
                out.push(Hole {
                    parent: ParentRef {
                        item: None,
                        source: self.source,
                    },
                    center: self.pos,
                    radius: bd.diameter / 2,
                    layers,
                    net: self.net,
                });
            }
        }
        out
    }
}
