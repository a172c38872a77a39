use geo::{AffineOps, AffineTransform, Coord, Polygon, coord};
use serde::{Deserialize, Serialize};

use crate::constants::PRESET_ANGLES;
use crate::error::{Result, SiteError};
use crate::ring::polygon_from;

/// Published outer dimensions of a house design, in meters. `width` runs
/// along the x axis of the unrotated footprint and `depth` along y.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseFootprintSpec {
    pub width: f64,
    pub depth: f64,
}

impl HouseFootprintSpec {
    pub const fn new(width: f64, depth: f64) -> Self {
        HouseFootprintSpec { width, depth }
    }

    pub fn place(&self, angle_degrees: f64, center: Coord<f64>) -> Result<Polygon<f64>> {
        place(self.width, self.depth, angle_degrees, center)
    }
}

/// Rotation slider presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPreset {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl RotationPreset {
    pub const ALL: [RotationPreset; 4] = [
        RotationPreset::Deg0,
        RotationPreset::Deg90,
        RotationPreset::Deg180,
        RotationPreset::Deg270,
    ];

    pub fn degrees(self) -> f64 {
        PRESET_ANGLES[self as usize]
    }

    pub fn from_degrees(angle: f64) -> Option<Self> {
        let a = wrap_degrees(angle);
        Self::ALL.into_iter().find(|p| p.degrees() == a)
    }
}

/// Wraps an angle into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let w = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if w >= 360.0 { 0.0 } else { w }
}

/// Wraps `angle` and snaps it to the nearest preset when it lies within
/// `within` degrees of one (across the 0/360 seam too).
pub fn snap_to_preset(angle: f64, within: f64) -> f64 {
    let a = wrap_degrees(angle);
    for preset in RotationPreset::ALL {
        let diff = (a - preset.degrees()).abs();
        if diff.min(360.0 - diff) <= within {
            return preset.degrees();
        }
    }
    a
}

/// Sine and cosine of an angle in degrees, exact at the quarter turns.
fn sin_cos_degrees(angle: f64) -> (f64, f64) {
    let a = wrap_degrees(angle);
    if a == 0.0 {
        (0.0, 1.0)
    } else if a == 90.0 {
        (1.0, 0.0)
    } else if a == 180.0 {
        (0.0, -1.0)
    } else if a == 270.0 {
        (-1.0, 0.0)
    } else {
        a.to_radians().sin_cos()
    }
}

/// Axis-aligned `width` x `depth` rectangle centered at the origin,
/// counter-clockwise from the bottom-left corner.
pub fn canonical_rectangle(width: f64, depth: f64) -> Result<Polygon<f64>> {
    if !(width.is_finite() && width > 0.0 && depth.is_finite() && depth > 0.0) {
        return Err(SiteError::invalid(format!(
            "footprint must have positive finite dimensions, got {width} x {depth}"
        )));
    }
    let (hw, hd) = (width / 2.0, depth / 2.0);
    Ok(polygon_from(&[
        coord! { x: -hw, y: -hd },
        coord! { x: hw, y: -hd },
        coord! { x: hw, y: hd },
        coord! { x: -hw, y: hd },
    ]))
}

/// Places a `width` x `depth` footprint rotated counter-clockwise by
/// `angle_degrees` about its own center, with that center at `center`.
///
/// Always derived from the canonical rectangle with the absolute angle, so
/// repeated calls during a drag never accumulate rounding error.
pub fn place(
    width: f64,
    depth: f64,
    angle_degrees: f64,
    center: Coord<f64>,
) -> Result<Polygon<f64>> {
    let rect = canonical_rectangle(width, depth)?;
    if !angle_degrees.is_finite() {
        return Err(SiteError::invalid("rotation angle is not finite"));
    }
    if !center.x.is_finite() || !center.y.is_finite() {
        return Err(SiteError::invalid("footprint center is not finite"));
    }
    let (s, c) = sin_cos_degrees(angle_degrees);
    let transform = AffineTransform::new(c, -s, center.x, s, c, center.y);
    Ok(rect.affine_transform(&transform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Point, Rotate};

    fn assert_same(a: &Polygon<f64>, b: &Polygon<f64>, tol: f64) {
        for (p, q) in a.exterior().coords().zip(b.exterior().coords()) {
            assert!(
                (p.x - q.x).abs() <= tol && (p.y - q.y).abs() <= tol,
                "{p:?} vs {q:?}"
            );
        }
    }

    #[test]
    fn unrotated_footprint_is_centered() {
        let fp = place(8.0, 6.0, 0.0, coord! { x: 5.0, y: 5.5 }).unwrap();
        let c = &fp.exterior().0;
        assert_eq!(c[0], coord! { x: 1.0, y: 2.5 });
        assert_eq!(c[2], coord! { x: 9.0, y: 8.5 });
        assert!((fp.unsigned_area() - 48.0).abs() < 1e-12);
    }

    #[test]
    fn quarter_turn_is_exact_and_counter_clockwise() {
        let fp = place(8.0, 6.0, 90.0, coord! { x: 0.0, y: 0.0 }).unwrap();
        // Bottom-left (-4, -3) rotates to (3, -4).
        assert_eq!(fp.exterior().0[0], coord! { x: 3.0, y: -4.0 });
        let again = place(8.0, 6.0, 450.0, coord! { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(fp, again);
    }

    #[test]
    fn direct_placement_matches_external_rotation() {
        let center = coord! { x: 12.5, y: -3.25 };
        let base = place(11.0, 7.5, 0.0, center).unwrap();
        for step in 0..72 {
            let theta = step as f64 * 5.0 + 0.3;
            let direct = place(11.0, 7.5, theta, center).unwrap();
            let rotated = base.rotate_around_point(theta, Point::from(center));
            assert_same(&direct, &rotated, 1e-9);
        }
    }

    #[test]
    fn rederivation_is_bit_for_bit_stable() {
        let center = coord! { x: 3.0, y: 4.0 };
        let first = place(10.0, 14.0, 37.5, center).unwrap();
        let mut angle = 37.5;
        // Simulate a slider dragged around and back.
        for _ in 0..1_000 {
            angle = wrap_degrees(angle + 7.25);
            let _ = place(10.0, 14.0, angle, center).unwrap();
        }
        let back = place(10.0, 14.0, 37.5, center).unwrap();
        assert_eq!(first, back);
    }

    #[test]
    fn wrap_and_snap() {
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        assert_eq!(wrap_degrees(-1e-20), 0.0);
        assert_eq!(snap_to_preset(88.5, 2.0), 90.0);
        assert_eq!(snap_to_preset(359.2, 1.0), 0.0);
        assert_eq!(snap_to_preset(45.0, 2.0), 45.0);
        assert_eq!(RotationPreset::from_degrees(-180.0), Some(RotationPreset::Deg180));
        assert_eq!(RotationPreset::Deg270.degrees(), 270.0);
    }

    #[test]
    fn bad_dimensions_are_invalid() {
        let c = coord! { x: 0.0, y: 0.0 };
        assert!(matches!(place(0.0, 5.0, 0.0, c), Err(SiteError::InvalidGeometry(_))));
        assert!(matches!(place(5.0, f64::NAN, 0.0, c), Err(SiteError::InvalidGeometry(_))));
        assert!(matches!(
            place(5.0, 5.0, f64::INFINITY, c),
            Err(SiteError::InvalidGeometry(_))
        ));
    }
}
