//! Default table-driven rule resolver
//!
//! Holds per-kind base clearances plus net- and layer-scoped overrides, the
//! keepout/net-tie exemption tables, and the differential-pair net map. All
//! lookups run over precomputed tables, so a shared reference is safe to
//! reuse across nodes and worker threads.

use super::{Constraint, ConstraintType, RuleResolver};
use crate::item::{Item, NetId};
use crate::layers::{LayerId, LayerRange};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A scoped rule: more specific overrides win over the base clearances.
/// `nets` matches the pair in either order; `None` fields are wildcards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleOverride {
    pub kind: ConstraintType,
    #[serde(default)]
    pub nets: Option<(NetId, NetId)>,
    #[serde(default)]
    pub layers: Option<LayerRange>,
    pub min: i64,
}

/// Design rules resolved from the rule compiler, plus engine defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignRules {
    pub clearance: i64,
    pub hole_clearance: i64,
    pub hole_to_hole: i64,
    pub edge_clearance: i64,
    /// Rounding slack subtracted for head items (see `RuleResolver::epsilon`)
    pub epsilon: i64,
    pub overrides: Vec<RuleOverride>,
    /// Source ids of keepout/rule-area items, exempt from clearance checks
    pub keepouts: HashSet<u64>,
    /// Unordered net pairs joined by a net tie
    pub net_ties: HashSet<(NetId, NetId)>,
    /// Differential pairs as (positive, negative) nets
    pub dp_pairs: Vec<(NetId, NetId)>,
}

impl Default for DesignRules {
    fn default() -> Self {
        // Board units are nanometers: 0.2 mm copper clearance, 0.25 mm
        // drill-to-drill, 0.3 mm to the board edge.
        Self {
            clearance: 200_000,
            hole_clearance: 200_000,
            hole_to_hole: 250_000,
            edge_clearance: 300_000,
            epsilon: 0,
            overrides: Vec::new(),
            keepouts: HashSet::new(),
            net_ties: HashSet::new(),
            dp_pairs: Vec::new(),
        }
    }
}

impl DesignRules {
    /// Load rules from a JSON file; missing fields take the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("failed to open rules file {:?}", path.as_ref()))?;
        let rules: DesignRules = serde_json::from_reader(BufReader::new(file))
            .context("failed to parse design rules JSON")?;
        rules.validate()?;
        Ok(rules)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.epsilon >= 0, "epsilon must be non-negative");
        for v in [
            self.clearance,
            self.hole_clearance,
            self.hole_to_hole,
            self.edge_clearance,
        ] {
            ensure!(v >= 0, "base clearances must be non-negative");
        }
        for ov in &self.overrides {
            ensure!(ov.min >= 0, "override clearances must be non-negative");
        }
        Ok(())
    }

    fn base(&self, kind: ConstraintType) -> i64 {
        match kind {
            ConstraintType::Clearance => self.clearance,
            ConstraintType::HoleClearance => self.hole_clearance,
            ConstraintType::HoleToHole => self.hole_to_hole,
            ConstraintType::EdgeClearance => self.edge_clearance,
        }
    }

    /// Upper bound over every clearance this rule set can resolve; nodes use
    /// it to size their spatial search margin.
    pub fn max_clearance(&self) -> i64 {
        let base = self
            .clearance
            .max(self.hole_clearance)
            .max(self.hole_to_hole)
            .max(self.edge_clearance);
        self.overrides.iter().fold(base, |m, ov| m.max(ov.min))
    }

    fn tie_contains(&self, net: NetId) -> bool {
        self.net_ties.iter().any(|(a, b)| *a == net || *b == net)
    }
}

impl RuleResolver for DesignRules {
    fn query_constraint(
        &self,
        kind: ConstraintType,
        a: &Item,
        b: Option<&Item>,
        layer: LayerId,
    ) -> Option<Constraint> {
        // (specificity, min): net scope outweighs layer scope
        let mut best: Option<(u8, i64)> = None;
        for ov in &self.overrides {
            if ov.kind != kind {
                continue;
            }
            let mut specificity = 0u8;
            if let Some((n1, n2)) = ov.nets {
                match (a.net(), b.and_then(|i| i.net())) {
                    (Some(na), Some(nb))
                        if (na == n1 && nb == n2) || (na == n2 && nb == n1) =>
                    {
                        specificity += 2;
                    }
                    _ => continue,
                }
            }
            if let Some(range) = ov.layers {
                if !range.overlaps(layer) {
                    continue;
                }
                specificity += 1;
            }
            let candidate = (specificity, ov.min);
            if best.map_or(true, |cur| candidate > cur) {
                best = Some(candidate);
            }
        }
        let min = best.map_or_else(|| self.base(kind), |(_, min)| min);
        Some(Constraint { min })
    }

    fn epsilon(&self) -> i64 {
        self.epsilon
    }

    fn largest_clearance(&self) -> Option<i64> {
        Some(self.max_clearance())
    }

    fn is_keepout(&self, item: &Item) -> bool {
        item.source().is_some_and(|s| self.keepouts.contains(&s))
    }

    fn is_net_tie_exclusion(&self, a: &Item, b: &Item) -> bool {
        match (a.net(), b.net()) {
            (Some(na), Some(nb)) => {
                self.net_ties.contains(&(na, nb)) || self.net_ties.contains(&(nb, na))
            }
            _ => false,
        }
    }

    fn is_in_net_tie(&self, item: &Item) -> bool {
        item.net().is_some_and(|n| self.tie_contains(n))
    }

    fn dp_coupled_net(&self, net: NetId) -> Option<NetId> {
        self.dp_pairs.iter().find_map(|(p, n)| {
            if *p == net {
                Some(*n)
            } else if *n == net {
                Some(*p)
            } else {
                None
            }
        })
    }

    fn dp_net_polarity(&self, net: NetId) -> i32 {
        for (p, n) in &self.dp_pairs {
            if *p == net {
                return 1;
            }
            if *n == net {
                return -1;
            }
        }
        0
    }

    fn dp_net_pair(&self, item: &Item) -> Option<(NetId, NetId)> {
        let net = item.net()?;
        self.dp_pairs
            .iter()
            .find(|(p, n)| *p == net || *n == net)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::item::{Drill, Segment, Via, ViaType};

    fn seg(net: u32, layer: LayerId) -> Item {
        Item::Segment(Segment {
            source: None,
            net: Some(NetId(net)),
            layers: LayerRange::single(layer),
            a: Point::new(0, 0),
            b: Point::new(1_000_000, 0),
            width: 250_000,
            locked: false,
        })
    }

    fn via(net: u32) -> Item {
        Item::Via(Via {
            source: Some(9),
            net: Some(NetId(net)),
            layers: LayerRange::new(0, 3),
            pos: Point::new(0, 0),
            diameter: 500_000,
            drill: Drill {
                diameter: 300_000,
                layers: LayerRange::new(0, 3),
            },
            backdrill: None,
            via_type: ViaType::Through,
        })
    }

    #[test]
    fn test_base_clearance_resolves() {
        let rules = DesignRules::default();
        let c = rules
            .query_constraint(ConstraintType::Clearance, &seg(1, 0), Some(&seg(2, 0)), 0)
            .unwrap();
        assert_eq!(c.min, 200_000);
    }

    #[test]
    fn test_net_override_beats_layer_override() {
        let mut rules = DesignRules::default();
        rules.overrides.push(RuleOverride {
            kind: ConstraintType::Clearance,
            nets: None,
            layers: Some(LayerRange::single(0)),
            min: 400_000,
        });
        rules.overrides.push(RuleOverride {
            kind: ConstraintType::Clearance,
            nets: Some((NetId(1), NetId(2))),
            layers: None,
            min: 500_000,
        });

        let c = rules
            .query_constraint(ConstraintType::Clearance, &seg(1, 0), Some(&seg(2, 0)), 0)
            .unwrap();
        assert_eq!(c.min, 500_000);

        // Different net pair: only the layer override applies
        let c = rules
            .query_constraint(ConstraintType::Clearance, &seg(3, 0), Some(&seg(4, 0)), 0)
            .unwrap();
        assert_eq!(c.min, 400_000);
    }

    #[test]
    fn test_epsilon_subtracted_for_head() {
        let mut rules = DesignRules::default();
        rules.epsilon = 10;
        let a = seg(1, 0);
        let b = seg(2, 0);
        let span = LayerRange::new(0, 3);
        assert_eq!(rules.clearance(&a, Some(&b), span, false), 200_000);
        assert_eq!(rules.clearance(&a, Some(&b), span, true), 199_990);
    }

    #[test]
    fn test_keepout_and_net_tie_predicates() {
        let mut rules = DesignRules::default();
        rules.keepouts.insert(9);
        rules.net_ties.insert((NetId(1), NetId(2)));

        assert!(rules.is_keepout(&via(5)));
        assert!(!rules.is_keepout(&seg(5, 0)));
        assert!(rules.is_net_tie_exclusion(&seg(1, 0), &seg(2, 0)));
        assert!(rules.is_net_tie_exclusion(&seg(2, 0), &seg(1, 0)));
        assert!(!rules.is_net_tie_exclusion(&seg(1, 0), &seg(3, 0)));
        assert!(rules.is_in_net_tie(&seg(2, 0)));
    }

    #[test]
    fn test_dp_queries() {
        let mut rules = DesignRules::default();
        rules.dp_pairs.push((NetId(10), NetId(11)));

        assert_eq!(rules.dp_coupled_net(NetId(10)), Some(NetId(11)));
        assert_eq!(rules.dp_coupled_net(NetId(11)), Some(NetId(10)));
        assert_eq!(rules.dp_coupled_net(NetId(12)), None);
        assert_eq!(rules.dp_net_polarity(NetId(10)), 1);
        assert_eq!(rules.dp_net_polarity(NetId(11)), -1);
        assert_eq!(rules.dp_net_polarity(NetId(12)), 0);
        assert_eq!(rules.dp_net_pair(&seg(11, 0)), Some((NetId(10), NetId(11))));
    }

    #[test]
    fn test_json_round_trip() {
        let mut rules = DesignRules::default();
        rules.clearance = 300_000;
        rules.overrides.push(RuleOverride {
            kind: ConstraintType::HoleToHole,
            nets: None,
            layers: Some(LayerRange::new(0, 1)),
            min: 600_000,
        });

        let json = serde_json::to_string(&rules).unwrap();
        let back: DesignRules = serde_json::from_str(&json).unwrap();
        assert_eq!(back.clearance, 300_000);
        assert_eq!(back.overrides.len(), 1);
        assert_eq!(back.overrides[0].min, 600_000);
    }

    #[test]
    fn test_reversed_override_layers_still_apply() {
        let rules: DesignRules = serde_json::from_str(
            r#"{"overrides": [{"kind": "Clearance", "layers": {"start": 2, "end": 0}, "min": 900000}]}"#,
        )
        .unwrap();
        let c = rules
            .query_constraint(ConstraintType::Clearance, &seg(1, 1), Some(&seg(2, 1)), 1)
            .unwrap();
        assert_eq!(c.min, 900_000);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let rules: DesignRules = serde_json::from_str(r#"{"clearance": 150000}"#).unwrap();
        assert_eq!(rules.clearance, 150_000);
        assert_eq!(rules.hole_to_hole, 250_000);
        assert!(rules.overrides.is_empty());
    }

    #[test]
    fn test_from_json_file_rejects_negative_values() {
        let path = std::env::temp_dir().join("router_engine_bad_rules.json");
        std::fs::write(&path, r#"{"epsilon": -5}"#).unwrap();
        assert!(DesignRules::from_json_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
