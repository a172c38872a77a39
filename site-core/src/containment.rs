use geo::Polygon;
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use serde::Serialize;

use crate::constants::CONTAINMENT_EPSILON_M;
use crate::ring::{distance_to_segment, segments_cross};

/// True when `footprint` is not fully inside `boundary`.
///
/// Touching the boundary does not count: a footprint identical to the
/// boundary never exceeds it.
pub fn exceeds(footprint: &Polygon<f64>, boundary: &Polygon<f64>) -> bool {
    exceeds_with_tolerance(footprint, boundary, CONTAINMENT_EPSILON_M)
}

/// [`exceeds`] with an explicit tolerance: vertices up to `epsilon` meters
/// outside the boundary still count as touching it.
///
/// A vertex outside the boundary is the usual failure. For a non-convex
/// boundary an edge can also cut across a reflex corner while both of its
/// ends stay inside, so edges are checked for proper crossings as well.
pub fn exceeds_with_tolerance(
    footprint: &Polygon<f64>,
    boundary: &Polygon<f64>,
    epsilon: f64,
) -> bool {
    let fp = &footprint.exterior().0;
    let bd = &boundary.exterior().0;
    if fp.len() < 2 {
        return false;
    }
    let vertices = &fp[..fp.len() - 1];

    let outside = |c: &geo::Coord<f64>| match boundary.coordinate_position(c) {
        CoordPos::Inside | CoordPos::OnBoundary => false,
        CoordPos::Outside => bd
            .windows(2)
            .all(|e| distance_to_segment(*c, e[0], e[1]) > epsilon),
    };
    if vertices.iter().any(outside) {
        return true;
    }

    fp.windows(2).any(|f| {
        bd.windows(2)
            .any(|b| segments_cross(f[0], f[1], b[0], b[1], epsilon))
    })
}

/// Result of feeding one containment sample to a [`ViolationTracker`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ViolationTransition {
    pub exceeds: bool,
    /// Set exactly once per violation onset.
    pub became_exceeded: bool,
    pub became_clear: bool,
}

/// Remembers the previous containment result so a caller can raise one
/// notification per violation onset even when `exceeds` is recomputed every
/// frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViolationTracker {
    previous: bool,
}

impl ViolationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, exceeds: bool) -> ViolationTransition {
        let t = ViolationTransition {
            exceeds,
            became_exceeded: exceeds && !self.previous,
            became_clear: !exceeds && self.previous,
        };
        self.previous = exceeds;
        t
    }

    /// Forget the previous sample. Called when the lot or footprint changes.
    pub fn reset(&mut self) {
        self.previous = false;
    }
}

/// A [`ViolationTracker`] bound to a session key; observing a different key
/// resets the tracker before the sample is applied.
#[derive(Clone, Debug)]
pub struct ViolationMonitor<K> {
    session: Option<K>,
    tracker: ViolationTracker,
}

impl<K> Default for ViolationMonitor<K> {
    fn default() -> Self {
        ViolationMonitor {
            session: None,
            tracker: ViolationTracker::default(),
        }
    }
}

impl<K: PartialEq + Clone> ViolationMonitor<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&K> {
        self.session.as_ref()
    }

    pub fn observe(&mut self, session: &K, exceeds: bool) -> ViolationTransition {
        if self.session.as_ref() != Some(session) {
            log::debug!("violation tracking reset for new session");
            self.tracker.reset();
            self.session = Some(session.clone());
        }
        self.tracker.update(exceeds)
    }

    pub fn reset(&mut self) {
        self.session = None;
        self.tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::place;
    use crate::ring::polygon_from;
    use geo::coord;

    fn boundary_40() -> Polygon<f64> {
        // 40 m² square centered at (5, 5.5).
        let h = 40.0f64.sqrt() / 2.0;
        polygon_from(&[
            coord! { x: 5.0 - h, y: 5.5 - h },
            coord! { x: 5.0 + h, y: 5.5 - h },
            coord! { x: 5.0 + h, y: 5.5 + h },
            coord! { x: 5.0 - h, y: 5.5 + h },
        ])
    }

    #[test]
    fn rotated_eight_by_six_exceeds_forty_square_meters() {
        let fp = place(8.0, 6.0, 45.0, coord! { x: 5.0, y: 5.5 }).unwrap();
        assert!(exceeds(&fp, &boundary_40()));
    }

    #[test]
    fn small_footprint_fits_at_every_angle() {
        let b = boundary_40();
        for deg in 0..360 {
            let fp = place(4.0, 3.0, deg as f64, coord! { x: 5.0, y: 5.5 }).unwrap();
            assert!(!exceeds(&fp, &b), "exceeds at {deg}");
        }
    }

    #[test]
    fn identical_polygon_never_exceeds() {
        let b = boundary_40();
        assert!(!exceeds(&b, &b));
        let fp = place(6.0, 6.0, 0.0, coord! { x: 0.0, y: 0.0 }).unwrap();
        let same = place(6.0, 6.0, 0.0, coord! { x: 0.0, y: 0.0 }).unwrap();
        assert!(!exceeds(&fp, &same));
    }

    #[test]
    fn one_vertex_outside_is_enough() {
        let b = polygon_from(&[
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 10.0, y: 10.0 },
            coord! { x: 0.0, y: 10.0 },
        ]);
        let fp = polygon_from(&[
            coord! { x: 2.0, y: 2.0 },
            coord! { x: 10.5, y: 2.0 },
            coord! { x: 8.0, y: 8.0 },
            coord! { x: 2.0, y: 8.0 },
        ]);
        assert!(exceeds(&fp, &b));
        // Within tolerance the same vertex only touches.
        assert!(!exceeds_with_tolerance(&fp, &b, 0.6));
    }

    #[test]
    fn edge_across_reflex_corner_exceeds() {
        // Arrow-head boundary with a notch at (5, 4).
        let b = polygon_from(&[
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 5.0, y: 4.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 5.0, y: 10.0 },
        ]);
        let fp = polygon_from(&[
            coord! { x: 2.0, y: 3.0 },
            coord! { x: 8.0, y: 3.0 },
            coord! { x: 8.0, y: 3.5 },
            coord! { x: 2.0, y: 3.5 },
        ]);
        // (2, 3) and (8, 3) sit inside the two wings.
        assert!(exceeds(&fp, &b));
    }

    #[test]
    fn tracker_fires_once_per_onset() {
        let mut t = ViolationTracker::new();
        assert!(!t.update(false).became_exceeded);
        assert!(t.update(true).became_exceeded);
        assert!(!t.update(true).became_exceeded);
        assert!(!t.update(true).became_exceeded);
        let clear = t.update(false);
        assert!(clear.became_clear && !clear.exceeds);
        assert!(t.update(true).became_exceeded);
    }

    #[test]
    fn monitor_resets_on_session_change() {
        let mut m: ViolationMonitor<(&str, &str)> = ViolationMonitor::new();
        assert!(m.observe(&("lot-1", "house-a"), true).became_exceeded);
        assert!(!m.observe(&("lot-1", "house-a"), true).became_exceeded);
        // Switching footprint: no stale "previous = true" carried over.
        let t = m.observe(&("lot-1", "house-b"), false);
        assert!(!t.became_clear);
        assert!(m.observe(&("lot-1", "house-b"), true).became_exceeded);
        m.reset();
        assert!(m.session().is_none());
    }
}
