use geo::{Area, Centroid, Coord, Polygon, Scale};

use crate::error::{Result, SiteError};

/// Area-weighted centroid of a polygon with non-zero area.
pub fn centroid_of(polygon: &Polygon<f64>) -> Result<Coord<f64>> {
    if polygon.unsigned_area() <= 0.0 {
        return Err(SiteError::degenerate("polygon has no area"));
    }
    polygon
        .centroid()
        .map(|p| p.0)
        .ok_or_else(|| SiteError::degenerate("polygon has no centroid"))
}

/// `target_area` clamped to `[0, area]`. NaN and negative targets clamp to 0.
pub fn clamp_target(target_area: f64, area: f64) -> f64 {
    target_area.max(0.0).min(area)
}

/// Uniformly scales `polygon` about its centroid so its area equals
/// `min(target_area, area(polygon))`.
///
/// The centroid is unchanged and the winding is preserved. A target of zero
/// collapses every vertex onto the centroid.
pub fn scale_to_area(polygon: &Polygon<f64>, target_area: f64) -> Result<Polygon<f64>> {
    let area = polygon.unsigned_area();
    if !area.is_finite() || area <= 0.0 {
        return Err(SiteError::degenerate("cannot scale a polygon with no area"));
    }
    let center = centroid_of(polygon)?;
    let k = (clamp_target(target_area, area) / area).sqrt();
    Ok(polygon.scale_around_point(k, k, center))
}
