use geo::{Coord, LineString, MapCoords, Polygon, coord};
use serde::{Deserialize, Serialize};

use crate::constants::{LAT_SERIES, LON_SERIES, MIN_LON_SCALE};
use crate::error::{Result, SiteError};
use crate::ring::validate_closed;

/// Local tangent-plane projection between `[lon, lat]` degrees and meters.
///
/// The plane is anchored at `origin`; x grows east and y grows north. Scale
/// factors come from the WGS84 meters-per-degree series evaluated at the
/// anchor latitude, which keeps distances within a small fraction of a
/// percent over a few hundred meters. The mapping is affine, so
/// unprojecting a projected coordinate returns the input up to rounding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalProjection {
    origin: Coord<f64>,
    m_per_deg_lon: f64,
    m_per_deg_lat: f64,
}

impl LocalProjection {
    pub fn anchored_at(origin: Coord<f64>) -> Result<Self> {
        if !origin.x.is_finite() || !origin.y.is_finite() {
            return Err(SiteError::invalid("projection origin is not finite"));
        }
        if !(-90.0..=90.0).contains(&origin.y) {
            return Err(SiteError::invalid(format!(
                "latitude {} is outside [-90, 90]",
                origin.y
            )));
        }
        let phi = origin.y.to_radians();
        let m_per_deg_lat = LAT_SERIES[0]
            + LAT_SERIES[1] * (2.0 * phi).cos()
            + LAT_SERIES[2] * (4.0 * phi).cos()
            + LAT_SERIES[3] * (6.0 * phi).cos();
        let m_per_deg_lon = LON_SERIES[0] * phi.cos()
            + LON_SERIES[1] * (3.0 * phi).cos()
            + LON_SERIES[2] * (5.0 * phi).cos();
        if m_per_deg_lon < MIN_LON_SCALE {
            return Err(SiteError::invalid("ring is too close to a pole to project"));
        }
        Ok(LocalProjection {
            origin,
            m_per_deg_lon,
            m_per_deg_lat,
        })
    }

    /// Anchors the plane at the mean of the ring's distinct vertices.
    pub fn for_ring(ring: &LineString<f64>) -> Result<Self> {
        validate_geographic(ring)?;
        let pts = &ring.0[..ring.0.len() - 1];
        let n = pts.len() as f64;
        let sum = pts
            .iter()
            .fold(coord! { x: 0.0, y: 0.0 }, |acc, c| acc + *c);
        Self::anchored_at(coord! { x: sum.x / n, y: sum.y / n })
    }

    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    pub fn to_planar(&self, c: Coord<f64>) -> Coord<f64> {
        coord! {
            x: (c.x - self.origin.x) * self.m_per_deg_lon,
            y: (c.y - self.origin.y) * self.m_per_deg_lat,
        }
    }

    pub fn to_geographic(&self, c: Coord<f64>) -> Coord<f64> {
        coord! {
            x: c.x / self.m_per_deg_lon + self.origin.x,
            y: c.y / self.m_per_deg_lat + self.origin.y,
        }
    }

    pub fn project(&self, ring: &LineString<f64>) -> Result<LineString<f64>> {
        validate_geographic(ring)?;
        let this = *self;
        Ok(ring.map_coords(move |c| this.to_planar(c)))
    }

    pub fn unproject(&self, ring: &LineString<f64>) -> Result<LineString<f64>> {
        validate_closed(ring)?;
        let this = *self;
        Ok(ring.map_coords(move |c| this.to_geographic(c)))
    }

    /// Exterior ring of a planar polygon, in geographic coordinates.
    pub fn unproject_polygon(&self, polygon: &Polygon<f64>) -> LineString<f64> {
        let this = *self;
        polygon.exterior().map_coords(move |c| this.to_geographic(c))
    }
}

/// Projects `ring` onto a plane anchored at its own vertex mean and returns
/// the projection alongside, so derived rings can be mapped back with the
/// same anchor.
pub fn project(ring: &LineString<f64>) -> Result<(LocalProjection, LineString<f64>)> {
    let projection = LocalProjection::for_ring(ring)?;
    let planar = projection.project(ring)?;
    Ok((projection, planar))
}

fn validate_geographic(ring: &LineString<f64>) -> Result<()> {
    validate_closed(ring)?;
    if let Some(c) = ring.coords().find(|c| !(-90.0..=90.0).contains(&c.y)) {
        return Err(SiteError::invalid(format!(
            "latitude {} is outside [-90, 90]",
            c.y
        )));
    }
    Ok(())
}
