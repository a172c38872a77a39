use geo::{Distance, Geodesic, LineString, Point};
use serde::Serialize;

use crate::error::{Result, SiteError};
use crate::ring::quad_vertices;

/// How nominal side lengths were matched to the lot ring's edges.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SideAssignment {
    /// `nominal_index[edge]` is the index into the nominal list assigned to
    /// that edge.
    pub nominal_index: [usize; 4],
    /// Measured length of each edge in traversal order, meters.
    pub actual: [f64; 4],
    /// Nominal length assigned to each edge, meters.
    pub nominal: [f64; 4],
    /// Sum of `|nominal - actual|` over the four edges.
    pub total_deviation: f64,
    /// Cyclic shift applied to the nominal list.
    pub rotation: usize,
    /// Whether the nominal list was read in reverse order.
    pub reflected: bool,
}

impl SideAssignment {
    fn build(actual: [f64; 4], nominal: [f64; 4], rotation: usize, reflected: bool) -> Self {
        let mut nominal_index = [0; 4];
        let mut assigned = [0.0; 4];
        for edge in 0..4 {
            let idx = if reflected {
                (rotation + 4 - edge) % 4
            } else {
                (edge + rotation) % 4
            };
            nominal_index[edge] = idx;
            assigned[edge] = nominal[idx];
        }
        let total_deviation = (0..4).map(|e| (assigned[e] - actual[e]).abs()).sum();
        SideAssignment {
            nominal_index,
            actual,
            nominal: assigned,
            total_deviation,
            rotation,
            reflected,
        }
    }

    /// Nominal lengths taken in the order they were supplied.
    pub fn identity(actual: [f64; 4], nominal: [f64; 4]) -> Self {
        Self::build(actual, nominal, 0, false)
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == 0 && !self.reflected
    }

    /// Per-edge relative error `|nominal - actual| / actual`.
    pub fn relative_errors(&self) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (e, r) in out.iter_mut().enumerate() {
            *r = (self.nominal[e] - self.actual[e]).abs() / self.actual[e];
        }
        out
    }

    fn worst_edge(&self) -> (usize, f64) {
        self.relative_errors()
            .into_iter()
            .enumerate()
            .fold((0, 0.0), |best, (e, r)| if r > best.1 { (e, r) } else { best })
    }
}

/// Geodesic (WGS84) length of each edge of a `[lon, lat]` quadrilateral
/// ring, in traversal order.
pub fn edge_lengths(ring: &LineString<f64>) -> Result<[f64; 4]> {
    let quad = quad_vertices(ring)?;
    let mut out = [0.0; 4];
    for (i, len) in out.iter_mut().enumerate() {
        *len = Geodesic.distance(Point::from(quad[i]), Point::from(quad[(i + 1) % 4]));
    }
    Ok(out)
}

/// Picks the dihedral arrangement of `nominal` that best matches `actual`.
///
/// Candidates are the four rotations of the supplied order followed by the
/// four rotations of its reverse; a candidate replaces the current best only
/// when strictly better, so ties keep the identity arrangement. When any
/// edge of the winner is off by more than `max_relative_error` the match is
/// rejected with [`SiteError::DataMismatch`].
pub fn assign_lengths(
    actual: [f64; 4],
    nominal: [f64; 4],
    max_relative_error: f64,
) -> Result<SideAssignment> {
    if actual.iter().any(|a| !a.is_finite() || *a <= 0.0) {
        return Err(SiteError::invalid("measured side lengths must be positive"));
    }
    if nominal.iter().any(|n| !n.is_finite()) {
        return Err(SiteError::invalid("nominal side lengths must be finite"));
    }

    let mut best = SideAssignment::identity(actual, nominal);
    for reflected in [false, true] {
        for rotation in 0..4 {
            let candidate = SideAssignment::build(actual, nominal, rotation, reflected);
            if candidate.total_deviation < best.total_deviation {
                best = candidate;
            }
        }
    }

    let (edge, relative_error) = best.worst_edge();
    if relative_error > max_relative_error {
        return Err(SiteError::DataMismatch {
            edge,
            nominal: best.nominal[edge],
            actual: best.actual[edge],
            relative_error,
        });
    }
    Ok(best)
}

/// Measures the ring's edges and matches `nominal` against them.
pub fn map_lengths(
    ring: &LineString<f64>,
    nominal: [f64; 4],
    max_relative_error: f64,
) -> Result<SideAssignment> {
    assign_lengths(edge_lengths(ring)?, nominal, max_relative_error)
}

/// Like [`map_lengths`], but a data mismatch falls back to the identity
/// arrangement instead of failing; the mismatch is returned alongside so the
/// caller can flag the labels as unreliable.
pub fn map_lengths_or_identity(
    ring: &LineString<f64>,
    nominal: [f64; 4],
    max_relative_error: f64,
) -> Result<(SideAssignment, Option<SiteError>)> {
    let actual = edge_lengths(ring)?;
    match assign_lengths(actual, nominal, max_relative_error) {
        Ok(a) => Ok((a, None)),
        Err(e @ SiteError::DataMismatch { .. }) => {
            log::warn!("{e}; falling back to supplied side order");
            Ok((SideAssignment::identity(actual, nominal), Some(e)))
        }
        Err(e) => Err(e),
    }
}
