//! Design-rule resolution
//!
//! The collision engine never sees rule source text; it consumes resolved
//! numeric constraints through the `RuleResolver` trait. Keeping the
//! resolver behind a trait seam means mock resolvers in tests and
//! wildly different rule sets in production plug into the same node.
//!
//! # Submodules
//! - `design_rules` - the default table-driven resolver

mod design_rules;

pub use design_rules::{DesignRules, RuleOverride};

use crate::item::{Item, NetId};
use crate::layers::{LayerId, LayerRange};
use serde::{Deserialize, Serialize};

/// Which clearance rule applies to a classified item pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Copper to copper
    Clearance,
    /// Drilled hole to copper
    HoleClearance,
    /// Drilled hole to drilled hole
    HoleToHole,
    /// Anything against board-outline/margin geometry
    EdgeClearance,
}

/// A resolved rule: the minimum required separation in board units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub min: i64,
}

/// Classify a pair of items into exactly one constraint type.
///
/// Fixed precedence: two holes are a hole-to-hole pair; otherwise anything
/// touching edge geometry is an edge-clearance pair (so an edge-adjacent
/// hole is still tested against the board edge); otherwise a single hole
/// makes it hole-to-copper; what remains is plain copper-to-copper.
pub fn classify(a: &Item, b: &Item) -> ConstraintType {
    if a.is_hole() && b.is_hole() {
        ConstraintType::HoleToHole
    } else if a.is_edge() || b.is_edge() {
        ConstraintType::EdgeClearance
    } else if a.is_hole() || b.is_hole() {
        ConstraintType::HoleClearance
    } else {
        ConstraintType::Clearance
    }
}

/// Strategy object mapping (item, item, layer, constraint kind) to resolved
/// rule values. Implementations must be idempotent and side-effect-free from
/// the node's perspective; the node never mutates resolver state.
pub trait RuleResolver {
    /// Most specific rule for `kind` between `a` and `b` on `layer`, or
    /// `None` when no rule matches. Callers fall back to zero clearance for
    /// an absent rule rather than erroring.
    fn query_constraint(
        &self,
        kind: ConstraintType,
        a: &Item,
        b: Option<&Item>,
        layer: LayerId,
    ) -> Option<Constraint>;

    /// Rounding slack subtracted when checking a head item in motion
    fn epsilon(&self) -> i64 {
        0
    }

    /// Upper bound over every clearance this resolver can return, when one
    /// is known. Nodes size their spatial search margin from it; a resolver
    /// answering `None` leaves the node on its built-in default margin.
    fn largest_clearance(&self) -> Option<i64> {
        None
    }

    /// Minimum required clearance between `a` and `b` (or between `a` and
    /// the board edge when `b` is `None`): per shared layer inside `span`
    /// (the board's copper span), classify the pair and resolve the rule,
    /// then take the largest resolved minimum across layers. Never an
    /// average; an unmatched layer contributes zero. Layers outside `span`
    /// are never resolved, so a rule scoped to a disabled layer cannot
    /// inflate the result.
    fn clearance(&self, a: &Item, b: Option<&Item>, span: LayerRange, use_epsilon: bool) -> i64 {
        let shared = match b {
            Some(b) => match a.layers().intersection(&b.layers()) {
                Some(l) => l,
                None => return 0,
            },
            None => a.layers(),
        };
        let layers = match shared.intersection(&span) {
            Some(l) => l,
            None => return 0,
        };
        let kind = match b {
            Some(b) => classify(a, b),
            None => ConstraintType::EdgeClearance,
        };

        let mut required = 0i64;
        for layer in layers.iter() {
            if let Some(c) = self.query_constraint(kind, a, b, layer) {
                required = required.max(c.min);
            }
        }
        if use_epsilon {
            (required - self.epsilon()).max(0)
        } else {
            required
        }
    }

    /// Item is a keepout/rule area; pairs involving it are exempt here and
    /// handled by the keepout machinery instead.
    fn is_keepout(&self, _item: &Item) -> bool {
        false
    }

    /// Pair is covered by a net-tie exclusion and must not be checked
    fn is_net_tie_exclusion(&self, _a: &Item, _b: &Item) -> bool {
        false
    }

    /// Item's net participates in some net tie
    fn is_in_net_tie(&self, _item: &Item) -> bool {
        false
    }

    fn is_drilled_hole(&self, item: &Item) -> bool {
        item.is_hole()
    }

    fn is_non_plated_slot(&self, _item: &Item) -> bool {
        false
    }

    /// Differential-pair partner of `net`, if any
    fn dp_coupled_net(&self, _net: NetId) -> Option<NetId> {
        None
    }

    /// +1 for the positive leg, -1 for the negative leg, 0 for unpaired
    fn dp_net_polarity(&self, _net: NetId) -> i32 {
        0
    }

    /// (positive, negative) nets of the pair the item belongs to
    fn dp_net_pair(&self, _item: &Item) -> Option<(NetId, NetId)> {
        None
    }
}

// A shared read-only resolver can back several nodes at once.
impl<R: RuleResolver + ?Sized> RuleResolver for &R {
    fn query_constraint(
        &self,
        kind: ConstraintType,
        a: &Item,
        b: Option<&Item>,
        layer: LayerId,
    ) -> Option<Constraint> {
        (**self).query_constraint(kind, a, b, layer)
    }
    fn epsilon(&self) -> i64 {
        (**self).epsilon()
    }
    fn largest_clearance(&self) -> Option<i64> {
        (**self).largest_clearance()
    }
    fn clearance(&self, a: &Item, b: Option<&Item>, span: LayerRange, use_epsilon: bool) -> i64 {
        (**self).clearance(a, b, span, use_epsilon)
    }
    fn is_keepout(&self, item: &Item) -> bool {
        (**self).is_keepout(item)
    }
    fn is_net_tie_exclusion(&self, a: &Item, b: &Item) -> bool {
        (**self).is_net_tie_exclusion(a, b)
    }
    fn is_in_net_tie(&self, item: &Item) -> bool {
        (**self).is_in_net_tie(item)
    }
    fn is_drilled_hole(&self, item: &Item) -> bool {
        (**self).is_drilled_hole(item)
    }
    fn is_non_plated_slot(&self, item: &Item) -> bool {
        (**self).is_non_plated_slot(item)
    }
    fn dp_coupled_net(&self, net: NetId) -> Option<NetId> {
        (**self).dp_coupled_net(net)
    }
    fn dp_net_polarity(&self, net: NetId) -> i32 {
        (**self).dp_net_polarity(net)
    }
    fn dp_net_pair(&self, item: &Item) -> Option<(NetId, NetId)> {
        (**self).dp_net_pair(item)
    }
}

impl<R: RuleResolver + ?Sized> RuleResolver for std::sync::Arc<R> {
    fn query_constraint(
        &self,
        kind: ConstraintType,
        a: &Item,
        b: Option<&Item>,
        layer: LayerId,
    ) -> Option<Constraint> {
        (**self).query_constraint(kind, a, b, layer)
    }
    fn epsilon(&self) -> i64 {
        (**self).epsilon()
    }
    fn largest_clearance(&self) -> Option<i64> {
        (**self).largest_clearance()
    }
    fn clearance(&self, a: &Item, b: Option<&Item>, span: LayerRange, use_epsilon: bool) -> i64 {
        (**self).clearance(a, b, span, use_epsilon)
    }
    fn is_keepout(&self, item: &Item) -> bool {
        (**self).is_keepout(item)
    }
    fn is_net_tie_exclusion(&self, a: &Item, b: &Item) -> bool {
        (**self).is_net_tie_exclusion(a, b)
    }
    fn is_in_net_tie(&self, item: &Item) -> bool {
        (**self).is_in_net_tie(item)
    }
    fn is_drilled_hole(&self, item: &Item) -> bool {
        (**self).is_drilled_hole(item)
    }
    fn is_non_plated_slot(&self, item: &Item) -> bool {
        (**self).is_non_plated_slot(item)
    }
    fn dp_coupled_net(&self, net: NetId) -> Option<NetId> {
        (**self).dp_coupled_net(net)
    }
    fn dp_net_polarity(&self, net: NetId) -> i32 {
        (**self).dp_net_polarity(net)
    }
    fn dp_net_pair(&self, item: &Item) -> Option<(NetId, NetId)> {
        (**self).dp_net_pair(item)
    }
}
