use serde::{Deserialize, Serialize};

use crate::config::Tolerances;
use crate::footprint::HouseFootprintSpec;
use crate::offset::SetbackSpec;
use crate::pipeline::{FsrTarget, SiteInput};
use crate::ring::ring_from_pairs;
use crate::session::SessionKey;

/// JSON description of one lot + house combination, as exchanged with the
/// map surface and read by the CLI.
///
/// ```json
/// {
///   "lot_id": "DP1234/7",
///   "lot": [[151.0, -33.8], [151.00016, -33.8], [151.00016, -33.80036],
///           [151.0, -33.80036], [151.0, -33.8]],
///   "setbacks": { "front": 6, "side": 1.5, "rear": 4 },
///   "fsr": { "ratio": 0.5 },
///   "footprint_id": "hampton-22",
///   "footprint": { "width": 11.2, "depth": 19.8 },
///   "rotation_deg": 15,
///   "nominal_sides": [15, 40, 15, 40]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteScenario {
    #[serde(default)]
    pub lot_id: String,
    pub lot: Vec<[f64; 2]>,
    #[serde(default)]
    pub setbacks: SetbackSpec,
    pub fsr: Option<FsrTarget>,
    #[serde(default)]
    pub footprint_id: String,
    pub footprint: Option<HouseFootprintSpec>,
    #[serde(default)]
    pub rotation_deg: f64,
    pub nominal_sides: Option<[f64; 4]>,
    #[serde(default)]
    pub tolerances: Tolerances,
}

impl SiteScenario {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_input(&self) -> SiteInput {
        SiteInput {
            lot: ring_from_pairs(&self.lot),
            setbacks: self.setbacks,
            fsr: self.fsr,
            footprint: self.footprint,
            rotation_deg: self.rotation_deg,
            nominal_sides: self.nominal_sides,
        }
    }

    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(self.lot_id.clone(), self.footprint_id.clone())
    }
}
