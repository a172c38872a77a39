//! Application-wide numeric constants.
//! Distances are in meters, areas in square meters and angles in degrees
//! unless noted otherwise.

/// Meters per degree of latitude, as a cosine series in multiples of 2φ
/// (WGS84).
pub const LAT_SERIES: [f64; 4] = [111_132.92, -559.82, 1.175, -0.0023];
/// Meters per degree of longitude, as a cosine series in odd multiples of φ
/// (WGS84).
pub const LON_SERIES: [f64; 3] = [111_412.84, -93.5, 0.118];
/// Below this many meters per degree of longitude the local plane is
/// unusable (within a few meters of a pole).
pub const MIN_LON_SCALE: f64 = 1e-3;

/// Distance a footprint vertex may sit outside the boundary and still count
/// as touching it.
pub const CONTAINMENT_EPSILON_M: f64 = 1e-6;
/// Largest per-side relative error accepted when matching nominal side
/// lengths to measured edges.
pub const SIDE_MISMATCH_RATIO: f64 = 0.5;
/// Polygons with less area than this are considered collapsed.
pub const AREA_EPSILON_M2: f64 = 1e-9;

/// Rotation slider presets.
pub const PRESET_ANGLES: [f64; 4] = [0.0, 90.0, 180.0, 270.0];
