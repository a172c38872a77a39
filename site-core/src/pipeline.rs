use geo::{Area, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::config::Tolerances;
use crate::containment::exceeds_with_tolerance;
use crate::error::{ErrorKind, Result, SiteError};
use crate::footprint::{HouseFootprintSpec, place, snap_to_preset, wrap_degrees};
use crate::offset::{SetbackSpec, inset};
use crate::projection::{LocalProjection, project};
use crate::ring::serialize_ring;
use crate::scale::{centroid_of, scale_to_area};
use crate::sides::{SideAssignment, map_lengths_or_identity};

/// Requested buildable area, either absolute or as a ratio of the lot's own
/// area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsrTarget {
    AreaM2(f64),
    Ratio(f64),
}

impl FsrTarget {
    /// Target area in m² for a lot of `lot_area_m2`.
    pub fn resolve(&self, lot_area_m2: f64) -> f64 {
        match *self {
            FsrTarget::AreaM2(a) => a,
            FsrTarget::Ratio(r) => r * lot_area_m2,
        }
    }
}

/// Everything one evaluation depends on. The caller owns the rotation value
/// and passes it in on every change.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteInput {
    /// Closed `[lon, lat]` ring of the lot.
    pub lot: LineString<f64>,
    pub setbacks: SetbackSpec,
    pub fsr: Option<FsrTarget>,
    pub footprint: Option<HouseFootprintSpec>,
    pub rotation_deg: f64,
    pub nominal_sides: Option<[f64; 4]>,
}

impl SiteInput {
    pub fn new(lot: LineString<f64>) -> Self {
        SiteInput {
            lot,
            setbacks: SetbackSpec::default(),
            fsr: None,
            footprint: None,
            rotation_deg: 0.0,
            nominal_sides: None,
        }
    }
}

/// Pipeline stage an [`Issue`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Envelope,
    FsrBoundary,
    Footprint,
    Sides,
}

/// A recoverable failure that caused an overlay to be omitted (or, for
/// sides, replaced by the identity fallback).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Issue {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

/// A derived polygon, ready to render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overlay {
    /// Exterior ring in `[lon, lat]`.
    #[serde(serialize_with = "serialize_ring")]
    pub ring: LineString<f64>,
    /// The same polygon in the lot's local metric plane.
    #[serde(skip)]
    pub planar: Polygon<f64>,
    pub area_m2: f64,
}

impl Overlay {
    fn new(projection: &LocalProjection, planar: Polygon<f64>) -> Self {
        Overlay {
            ring: projection.unproject_polygon(&planar),
            area_m2: planar.unsigned_area(),
            planar,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SiteReport {
    pub lot_area_m2: f64,
    pub envelope: Option<Overlay>,
    pub fsr_boundary: Option<Overlay>,
    pub footprint: Option<Overlay>,
    /// Rotation actually applied, wrapped (and snapped if configured).
    pub rotation_deg: f64,
    /// `None` when there is no footprint or no boundary to test against.
    pub exceeds: Option<bool>,
    pub sides: Option<SideAssignment>,
    pub issues: Vec<Issue>,
    #[serde(skip)]
    pub projection: LocalProjection,
    #[serde(skip)]
    pub planar_lot: Polygon<f64>,
}

impl SiteReport {
    pub fn has_issue(&self, stage: Stage) -> bool {
        self.issues.iter().any(|i| i.stage == stage)
    }
}

fn note(issues: &mut Vec<Issue>, stage: Stage, err: &SiteError) {
    log::warn!("{stage:?} omitted: {err}");
    issues.push(Issue {
        stage,
        kind: err.kind(),
        message: err.to_string(),
    });
}

/// Runs projection, setback inset, FSR scaling, footprint placement and the
/// containment test for one set of inputs.
///
/// Only an unusable lot ring fails the whole call. Every later stage that
/// fails is recorded in [`SiteReport::issues`] and its overlay is omitted,
/// along with anything that depends on it.
pub fn evaluate(input: &SiteInput, tolerances: &Tolerances) -> Result<SiteReport> {
    let (projection, planar_ring) = project(&input.lot)?;
    let planar_lot = Polygon::new(planar_ring.clone(), vec![]);
    let lot_area_m2 = planar_lot.unsigned_area();
    let mut issues = Vec::new();

    let envelope = match inset(&planar_ring, &input.setbacks) {
        Ok(p) => Some(Overlay::new(&projection, p)),
        Err(e) => {
            note(&mut issues, Stage::Envelope, &e);
            None
        }
    };

    let fsr_boundary = match (&envelope, input.fsr) {
        (Some(env), Some(target)) => {
            let scaled = scale_to_area(&env.planar, target.resolve(lot_area_m2)).and_then(|p| {
                if p.unsigned_area() > tolerances.area_epsilon_m2 {
                    Ok(p)
                } else {
                    Err(SiteError::degenerate("FSR target leaves no buildable area"))
                }
            });
            match scaled {
                Ok(p) => Some(Overlay::new(&projection, p)),
                Err(e) => {
                    note(&mut issues, Stage::FsrBoundary, &e);
                    None
                }
            }
        }
        _ => None,
    };

    let mut rotation_deg = wrap_degrees(input.rotation_deg);
    if tolerances.snap_within_degrees > 0.0 {
        rotation_deg = snap_to_preset(rotation_deg, tolerances.snap_within_degrees);
    }

    let footprint = match (&envelope, input.footprint) {
        (Some(env), Some(spec)) => {
            match centroid_of(&env.planar).and_then(|c| spec.place(rotation_deg, c)) {
                Ok(p) => Some(Overlay::new(&projection, p)),
                Err(e) => {
                    note(&mut issues, Stage::Footprint, &e);
                    None
                }
            }
        }
        _ => None,
    };

    // A requested but failed FSR boundary must not silently fall back to the
    // larger envelope.
    let boundary = match input.fsr {
        Some(_) => fsr_boundary.as_ref(),
        None => envelope.as_ref(),
    };
    let exceeds = match (&footprint, boundary) {
        (Some(fp), Some(b)) => Some(exceeds_with_tolerance(
            &fp.planar,
            &b.planar,
            tolerances.containment_epsilon_m,
        )),
        _ => None,
    };

    let sides = match input.nominal_sides {
        Some(nominal) => {
            match map_lengths_or_identity(&input.lot, nominal, tolerances.side_mismatch_ratio) {
                Ok((assignment, mismatch)) => {
                    if let Some(e) = mismatch {
                        issues.push(Issue {
                            stage: Stage::Sides,
                            kind: e.kind(),
                            message: e.to_string(),
                        });
                    }
                    Some(assignment)
                }
                Err(e) => {
                    note(&mut issues, Stage::Sides, &e);
                    None
                }
            }
        }
        None => None,
    };

    log::debug!(
        "lot {:.1} m², envelope {:?} m², fsr {:?} m², rotation {:.1}°, exceeds {:?}",
        lot_area_m2,
        envelope.as_ref().map(|o| o.area_m2),
        fsr_boundary.as_ref().map(|o| o.area_m2),
        rotation_deg,
        exceeds
    );

    Ok(SiteReport {
        lot_area_m2,
        envelope,
        fsr_boundary,
        footprint,
        rotation_deg,
        exceeds,
        sides,
        issues,
        projection,
        planar_lot,
    })
}
