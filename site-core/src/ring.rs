use geo::{Area, Coord, LineString, Polygon};
use serde::Serializer;

use crate::error::{Result, SiteError};

/// Checks that `ring` is closed (first == last) with at least four finite
/// coordinates.
pub fn validate_closed(ring: &LineString<f64>) -> Result<()> {
    let n = ring.0.len();
    if n < 4 {
        return Err(SiteError::invalid(format!(
            "ring has {n} coordinates, at least 4 are required"
        )));
    }
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(SiteError::invalid("ring contains non-finite coordinates"));
    }
    if ring.0[0] != ring.0[n - 1] {
        return Err(SiteError::invalid("ring is not closed"));
    }
    Ok(())
}

/// The four corners of a closed quadrilateral ring, in traversal order.
///
/// Rejects rings that are not exactly four distinct vertices, repeat a
/// vertex, cross themselves or enclose no area.
pub fn quad_vertices(ring: &LineString<f64>) -> Result<[Coord<f64>; 4]> {
    validate_closed(ring)?;
    let pts = &ring.0[..ring.0.len() - 1];
    if pts.len() != 4 {
        return Err(SiteError::invalid(format!(
            "lot ring must have exactly 4 distinct vertices, got {}",
            pts.len()
        )));
    }
    let quad = [pts[0], pts[1], pts[2], pts[3]];
    for i in 0..4 {
        for j in (i + 1)..4 {
            if quad[i] == quad[j] {
                return Err(SiteError::invalid(format!(
                    "vertices {i} and {j} coincide"
                )));
            }
        }
    }
    if !is_simple_quad(&quad) {
        return Err(SiteError::invalid("lot ring is self-intersecting"));
    }
    if signed_area(&quad) == 0.0 {
        return Err(SiteError::invalid("lot ring has zero area"));
    }
    Ok(quad)
}

/// Shoelace area of an open vertex list; positive when counter-clockwise.
pub fn signed_area(pts: &[Coord<f64>]) -> f64 {
    polygon_from(pts).signed_area()
}

pub fn polygon_from(pts: &[Coord<f64>]) -> Polygon<f64> {
    Polygon::new(LineString::from(pts.to_vec()), vec![])
}

/// Signed distance of `p` from the infinite line through `a` and `b`;
/// positive on the left. NaN when `a == b`.
pub fn side_of(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> f64 {
    let ab = b - a;
    let ap = p - a;
    (ab.x * ap.y - ab.y * ap.x) / ab.x.hypot(ab.y)
}

/// True when the two segments cross each other with every endpoint at
/// least `eps` away from the other segment's line. Touching or collinear
/// segments never cross.
pub fn segments_cross(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
    eps: f64,
) -> bool {
    let d1 = side_of(a1, a2, b1);
    let d2 = side_of(a1, a2, b2);
    let d3 = side_of(b1, b2, a1);
    let d4 = side_of(b1, b2, a2);
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

pub fn is_simple_quad(q: &[Coord<f64>; 4]) -> bool {
    !segments_cross(q[0], q[1], q[2], q[3], 0.0) && !segments_cross(q[1], q[2], q[3], q[0], 0.0)
}

/// Distance from `p` to the closed segment `a`–`b`.
pub fn distance_to_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0)
    };
    let q = a + ab * t;
    (p.x - q.x).hypot(p.y - q.y)
}

pub fn ring_from_pairs(pairs: &[[f64; 2]]) -> LineString<f64> {
    LineString::from(pairs.to_vec())
}

pub fn ring_to_pairs(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

/// Serializes a ring as `[[x, y], ...]` (GeoJSON coordinate order).
pub fn serialize_ring<S: Serializer>(
    ring: &LineString<f64>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.collect_seq(ring.coords().map(|c| [c.x, c.y]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn square() -> LineString<f64> {
        ring_from_pairs(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]])
    }

    #[test]
    fn closed_square_is_a_quad() {
        let q = quad_vertices(&square()).unwrap();
        assert_eq!(q[2], coord! { x: 10.0, y: 10.0 });
        assert_eq!(signed_area(&q), 100.0);
    }

    #[test]
    fn unclosed_and_short_rings_are_rejected() {
        let open = ring_from_pairs(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        assert!(matches!(
            validate_closed(&open),
            Err(SiteError::InvalidGeometry(_))
        ));
        let short = ring_from_pairs(&[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]);
        assert!(validate_closed(&short).is_err());
    }

    #[test]
    fn triangle_and_pentagon_are_not_quads() {
        let tri = ring_from_pairs(&[[0.0, 0.0], [4.0, 0.0], [0.0, 3.0], [0.0, 0.0]]);
        assert!(quad_vertices(&tri).is_err());
        let penta = ring_from_pairs(&[
            [0.0, 0.0],
            [4.0, 0.0],
            [5.0, 3.0],
            [2.0, 5.0],
            [-1.0, 3.0],
            [0.0, 0.0],
        ]);
        assert!(quad_vertices(&penta).is_err());
    }

    #[test]
    fn bowtie_is_rejected() {
        let bowtie =
            ring_from_pairs(&[[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 10.0], [0.0, 0.0]]);
        assert!(matches!(
            quad_vertices(&bowtie),
            Err(SiteError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn touching_segments_do_not_cross() {
        let a1 = coord! { x: 0.0, y: 0.0 };
        let a2 = coord! { x: 10.0, y: 0.0 };
        assert!(!segments_cross(
            a1,
            a2,
            coord! { x: 5.0, y: 0.0 },
            coord! { x: 5.0, y: 5.0 },
            0.0
        ));
        assert!(segments_cross(
            a1,
            a2,
            coord! { x: 5.0, y: -1.0 },
            coord! { x: 5.0, y: 5.0 },
            0.0
        ));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = coord! { x: 0.0, y: 0.0 };
        let b = coord! { x: 10.0, y: 0.0 };
        assert_eq!(distance_to_segment(coord! { x: 5.0, y: 3.0 }, a, b), 3.0);
        assert_eq!(distance_to_segment(coord! { x: 13.0, y: 4.0 }, a, b), 5.0);
    }
}
