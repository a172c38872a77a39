use geo::{Coord, LineString, Polygon, coord};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};
use crate::ring::{is_simple_quad, polygon_from, quad_vertices, signed_area};

/// Planning setbacks in meters.
///
/// Edges are labelled purely by traversal order of the lot ring: edge 0 is
/// the front, edges 1 and 2 are sides and edge 3 is the rear. Nothing checks
/// this against real frontage data; callers that know the street frontage
/// must rotate the ring so the frontage edge comes first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetbackSpec {
    pub front: f64,
    pub side: f64,
    pub rear: f64,
}

impl SetbackSpec {
    pub const fn new(front: f64, side: f64, rear: f64) -> Self {
        SetbackSpec { front, side, rear }
    }

    pub const fn uniform(d: f64) -> Self {
        SetbackSpec::new(d, d, d)
    }

    /// Setback distance for each lot edge in traversal order.
    pub fn per_edge(&self) -> [f64; 4] {
        [self.front, self.side, self.side, self.rear]
    }

    pub fn validate(&self) -> Result<()> {
        for (name, d) in [("front", self.front), ("side", self.side), ("rear", self.rear)] {
            if !d.is_finite() || d < 0.0 {
                return Err(SiteError::invalid(format!(
                    "{name} setback must be a non-negative distance, got {d}"
                )));
            }
        }
        Ok(())
    }
}

/// An edge line pushed inward by its setback.
#[derive(Clone, Copy, Debug)]
struct OffsetLine {
    origin: Coord<f64>,
    dir: Coord<f64>,
}

impl OffsetLine {
    fn intersect(&self, other: &OffsetLine) -> Option<Coord<f64>> {
        let denom = self.dir.x * other.dir.y - self.dir.y * other.dir.x;
        // Both directions are unit vectors, so denom is the sine of the
        // angle between them.
        if denom.abs() < 1e-12 {
            return None;
        }
        let d = other.origin - self.origin;
        let t = (d.x * other.dir.y - d.y * other.dir.x) / denom;
        Some(self.origin + self.dir * t)
    }
}

/// Insets a planar quadrilateral lot ring by per-edge setbacks.
///
/// Each edge line is translated along its inward normal and the new corners
/// are the intersections of consecutive translated lines, so unequal
/// setbacks and non-rectangular lots keep straight, parallel edges. The
/// returned polygon keeps the winding of the input and its vertex `i` is the
/// inset counterpart of input vertex `i`.
pub fn inset(ring: &LineString<f64>, setbacks: &SetbackSpec) -> Result<Polygon<f64>> {
    let quad = quad_vertices(ring)?;
    setbacks.validate()?;

    let area = signed_area(&quad);
    let sign = if area > 0.0 { -1.0 } else { 1.0 };
    let distances = setbacks.per_edge();

    let mut lines = [OffsetLine {
        origin: coord! { x: 0.0, y: 0.0 },
        dir: coord! { x: 0.0, y: 0.0 },
    }; 4];
    for (i, line) in lines.iter_mut().enumerate() {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let edge = b - a;
        let dir = edge / edge.x.hypot(edge.y);
        // Clockwise perpendicular, flipped for counter-clockwise rings.
        let normal = coord! { x: dir.y, y: -dir.x } * sign;
        *line = OffsetLine {
            origin: a + normal * distances[i],
            dir,
        };
    }

    let mut corners = [coord! { x: 0.0, y: 0.0 }; 4];
    for (i, corner) in corners.iter_mut().enumerate() {
        let prev = &lines[(i + 3) % 4];
        *corner = prev.intersect(&lines[i]).ok_or_else(|| {
            SiteError::degenerate(format!("edges {} and {i} are parallel", (i + 3) % 4))
        })?;
    }

    let inset_area = signed_area(&corners);
    if inset_area * area <= 0.0 {
        return Err(SiteError::degenerate("setbacks leave no buildable area"));
    }
    if !is_simple_quad(&corners) {
        return Err(SiteError::degenerate("inset polygon is self-intersecting"));
    }
    if inset_area.abs() > area.abs() * (1.0 + 1e-9) {
        // Reflex corners can push offset lines outward past the lot.
        return Err(SiteError::degenerate("inset polygon is larger than the lot"));
    }
    // Setbacks wider than the lot on both axes carry the offset lines past
    // each other and turn the quad half a turn without changing its winding.
    for (i, line) in lines.iter().enumerate() {
        let edge = corners[(i + 1) % 4] - corners[i];
        if edge.x * line.dir.x + edge.y * line.dir.y <= 0.0 {
            return Err(SiteError::degenerate(format!(
                "setbacks reverse edge {i}, leaving no buildable area"
            )));
        }
    }
    Ok(polygon_from(&corners))
}
