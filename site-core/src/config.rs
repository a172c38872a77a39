use serde::{Deserialize, Serialize};

use crate::constants::{AREA_EPSILON_M2, CONTAINMENT_EPSILON_M, SIDE_MISMATCH_RATIO};

/// Numeric tolerances for one evaluation. Every field has a default so a
/// partial JSON object (or `{}`) is a valid configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Footprint vertices closer than this to the boundary count as inside.
    pub containment_epsilon_m: f64,
    /// Largest relative error accepted per side when matching nominal
    /// lengths to measured edges.
    pub side_mismatch_ratio: f64,
    /// Minimum area for a derived polygon to be considered non-degenerate.
    pub area_epsilon_m2: f64,
    /// When positive, rotations within this many degrees of a preset snap to
    /// it. Zero disables snapping.
    pub snap_within_degrees: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            containment_epsilon_m: CONTAINMENT_EPSILON_M,
            side_mismatch_ratio: SIDE_MISMATCH_RATIO,
            area_epsilon_m2: AREA_EPSILON_M2,
            snap_within_degrees: 0.0,
        }
    }
}

impl Tolerances {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let t = Tolerances::from_json("{}").unwrap();
        assert_eq!(t, Tolerances::default());
    }

    #[test]
    fn partial_object_overrides_named_fields_only() {
        let t = Tolerances::from_json(r#"{"side_mismatch_ratio":0.25,"snap_within_degrees":3}"#)
            .unwrap();
        assert_eq!(t.side_mismatch_ratio, 0.25);
        assert_eq!(t.snap_within_degrees, 3.0);
        assert_eq!(t.containment_epsilon_m, CONTAINMENT_EPSILON_M);
    }
}
