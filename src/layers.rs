//! Board layer ranges
//!
//! Items in the engine span an inclusive interval of physical layers rather
//! than living on a single named layer. Every item and every constraint query
//! goes through `LayerRange`.

use serde::{Deserialize, Serialize};

/// Physical/logical layer index on the board stack
pub type LayerId = i32;

/// Inclusive, normalized interval of layers (`start <= end` always holds)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawLayerRange")]
pub struct LayerRange {
    start: LayerId,
    end: LayerId,
}

// Deserialization funnels through `new` so reversed ranges in rule files
// come out normalized like every other construction path.
#[derive(Deserialize)]
struct RawLayerRange {
    start: LayerId,
    end: LayerId,
}

impl From<RawLayerRange> for LayerRange {
    fn from(raw: RawLayerRange) -> Self {
        LayerRange::new(raw.start, raw.end)
    }
}

impl LayerRange {
    /// Build a range from two layers in either order; reversed inputs are
    /// swapped rather than rejected.
    pub fn new(a: LayerId, b: LayerId) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Range covering a single layer
    pub fn single(layer: LayerId) -> Self {
        Self {
            start: layer,
            end: layer,
        }
    }

    pub fn start(&self) -> LayerId {
        self.start
    }

    pub fn end(&self) -> LayerId {
        self.end
    }

    pub fn overlaps(&self, layer: LayerId) -> bool {
        layer >= self.start && layer <= self.end
    }

    pub fn overlaps_range(&self, other: &LayerRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Intersection of two ranges; `None` when they are disjoint.
    pub fn intersection(&self, other: &LayerRange) -> Option<LayerRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Some(LayerRange { start, end })
        } else {
            None
        }
    }

    /// True when `other` lies entirely inside this range
    pub fn contains_range(&self, other: &LayerRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<LayerId> {
        self.start..=self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_range_normalizes() {
        let r = LayerRange::new(1, 0);
        assert_eq!(r.start(), 0);
        assert_eq!(r.end(), 1);
        assert!(r.overlaps(0));
        assert!(r.overlaps(1));
        assert!(!r.overlaps(2));
    }

    #[test]
    fn test_intersection() {
        let a = LayerRange::new(0, 3);
        let b = LayerRange::new(2, 5);
        assert_eq!(a.intersection(&b), Some(LayerRange::new(2, 3)));

        let c = LayerRange::new(4, 5);
        assert_eq!(a.intersection(&c), None);
        assert!(!a.overlaps_range(&c));
    }

    #[test]
    fn test_single_and_contains() {
        let r = LayerRange::single(2);
        assert_eq!(r.start(), 2);
        assert_eq!(r.end(), 2);
        assert!(LayerRange::new(0, 3).contains_range(&r));
        assert!(!r.contains_range(&LayerRange::new(0, 3)));
    }

    #[test]
    fn test_reversed_range_normalizes_through_serde() {
        let r: LayerRange = serde_json::from_str(r#"{"start": 2, "end": 0}"#).unwrap();
        assert_eq!(r, LayerRange::new(0, 2));
        assert!(r.overlaps(1));
    }

    #[test]
    fn test_iter() {
        let layers: Vec<LayerId> = LayerRange::new(1, 3).iter().collect();
        assert_eq!(layers, vec![1, 2, 3]);
    }
}
