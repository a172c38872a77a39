use std::cell::RefCell;

use geo_types::LineString;
use site_core::ring::ring_from_pairs;
use site_core::{
    FsrTarget, HouseFootprintSpec, RotationPreset, SessionKey, SetbackSpec, SiteInput,
    SiteSession, Tolerances, wrap_degrees,
};

use crate::constants::{DEFAULT_FOOTPRINT_ID, DEFAULT_LOT_ID};
use crate::models::{ErrorBody, LotPayload};

/// Inputs the map surface has set so far plus the violation session they
/// feed. Every setter only records; `evaluate_json` runs the pipeline.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub lot_id: String,
    pub lot: Option<LineString<f64>>,
    pub setbacks: SetbackSpec,
    pub fsr: Option<FsrTarget>,
    pub footprint_id: String,
    pub footprint: Option<HouseFootprintSpec>,
    pub rotation_deg: f64,
    pub nominal_sides: Option<[f64; 4]>,
    pub session: SiteSession,
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<AppState> = RefCell::new(AppState::default());
}

pub fn with_state<R>(f: impl FnOnce(&mut AppState) -> R) -> R {
    STATE.with(|s| f(&mut s.borrow_mut()))
}

fn or_default(id: Option<&str>, fallback: &str) -> String {
    match id.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}

impl AppState {
    pub fn set_lot_json(&mut self, json: &str) -> Result<(), String> {
        let payload: LotPayload =
            serde_json::from_str(json).map_err(|e| format!("invalid lot JSON: {e}"))?;
        let ring = ring_from_pairs(&payload.ring);
        // Ids are optional, so a new ring alone must restart tracking.
        if self.lot.as_ref() != Some(&ring) {
            self.session.reset();
        }
        self.lot_id = or_default(payload.id.as_deref(), DEFAULT_LOT_ID);
        self.lot = Some(ring);
        Ok(())
    }

    pub fn clear_lot(&mut self) {
        self.lot = None;
        self.lot_id.clear();
        self.session.reset();
    }

    pub fn set_footprint(&mut self, id: &str, width: f64, depth: f64) {
        let spec = HouseFootprintSpec::new(width, depth);
        if self.footprint != Some(spec) {
            self.session.reset();
        }
        self.footprint_id = or_default(Some(id), DEFAULT_FOOTPRINT_ID);
        self.footprint = Some(spec);
    }

    pub fn clear_footprint(&mut self) {
        self.footprint = None;
        self.footprint_id.clear();
    }

    pub fn set_rotation(&mut self, degrees: f64) -> f64 {
        self.rotation_deg = wrap_degrees(degrees);
        self.rotation_deg
    }

    /// Jumps to one of the 0/90/180/270 presets.
    pub fn snap_rotation(&mut self, preset_degrees: f64) -> Result<f64, String> {
        let preset = RotationPreset::from_degrees(preset_degrees)
            .ok_or_else(|| format!("{preset_degrees} is not a rotation preset"))?;
        self.rotation_deg = preset.degrees();
        Ok(self.rotation_deg)
    }

    /// `null` clears the labels.
    pub fn set_nominal_sides_json(&mut self, json: &str) -> Result<(), String> {
        self.nominal_sides =
            serde_json::from_str(json).map_err(|e| format!("invalid side lengths: {e}"))?;
        Ok(())
    }

    pub fn set_tolerances_json(&mut self, json: &str) -> Result<(), String> {
        let t = Tolerances::from_json(json).map_err(|e| format!("invalid tolerances: {e}"))?;
        self.session.set_tolerances(t);
        Ok(())
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.lot_id.clone(), self.footprint_id.clone())
    }

    pub fn input(&self) -> Option<SiteInput> {
        let lot = self.lot.clone()?;
        Some(SiteInput {
            setbacks: self.setbacks,
            fsr: self.fsr,
            footprint: self.footprint,
            rotation_deg: self.rotation_deg,
            nominal_sides: self.nominal_sides,
            ..SiteInput::new(lot)
        })
    }

    /// Runs the pipeline on the current inputs and returns the session update
    /// (report plus violation transition) or an `{"error": ...}` body.
    pub fn evaluate_json(&mut self) -> String {
        let Some(input) = self.input() else {
            return error_json(&ErrorBody::message("no lot selected"));
        };
        let key = self.key();
        match self.session.evaluate(&key, &input) {
            Ok(update) => serde_json::to_string(&update).unwrap_or_else(|e| {
                error_json(&ErrorBody::message(format!("serialization failed: {e}")))
            }),
            Err(e) => {
                log::warn!("lot {} rejected: {e}", key.lot_id);
                error_json(&ErrorBody::from(&e))
            }
        }
    }
}

fn error_json(body: &ErrorBody) -> String {
    serde_json::to_string(body)
        .unwrap_or_else(|_| "{\"error\":{\"message\":\"unknown\"}}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const LOT: &str = r#"{"id":"DP1/1","ring":[[151.0,-33.8],[151.00016,-33.8],[151.00016,-33.80036],[151.0,-33.80036],[151.0,-33.8]]}"#;

    fn ready() -> AppState {
        let mut s = AppState::default();
        s.set_lot_json(LOT).unwrap();
        s.setbacks = SetbackSpec::new(6.0, 1.0, 1.0);
        s.set_footprint("design-a", 10.0, 14.0);
        s
    }

    fn eval(s: &mut AppState) -> Value {
        serde_json::from_str(&s.evaluate_json()).unwrap()
    }

    #[test]
    fn evaluate_without_lot_reports_error() {
        let v = eval(&mut AppState::default());
        assert_eq!(v["error"]["message"], "no lot selected");
    }

    #[test]
    fn rotation_drag_emits_single_onset() {
        let mut s = ready();
        let v = eval(&mut s);
        assert_eq!(v["exceeds"], false);
        assert!(v["envelope"]["ring"].is_array());

        let mut onsets = 0;
        for deg in [30.0, 60.0, 90.0, 90.0, 95.0] {
            s.set_rotation(deg);
            let v = eval(&mut s);
            if v["violation"]["became_exceeded"] == true {
                onsets += 1;
            }
        }
        assert_eq!(onsets, 1);
        assert_eq!(s.snap_rotation(0.0).unwrap(), 0.0);
        assert_eq!(eval(&mut s)["violation"]["became_clear"], true);
    }

    #[test]
    fn new_footprint_restarts_violation_tracking() {
        let mut s = ready();
        s.set_rotation(90.0);
        assert_eq!(eval(&mut s)["violation"]["became_exceeded"], true);
        assert_eq!(eval(&mut s)["violation"]["became_exceeded"], false);
        s.set_footprint("design-b", 10.0, 14.0);
        assert_eq!(eval(&mut s)["violation"]["became_exceeded"], true);
    }

    #[test]
    fn lot_or_design_change_without_ids_restarts_tracking() {
        let mut s = AppState::default();
        s.set_lot_json(r#"{"ring":[[151.0,-33.8],[151.00016,-33.8],[151.00016,-33.80036],[151.0,-33.80036],[151.0,-33.8]]}"#)
            .unwrap();
        s.setbacks = SetbackSpec::new(6.0, 1.0, 1.0);
        s.set_footprint("", 10.0, 14.0);
        s.set_rotation(90.0);
        assert_eq!(eval(&mut s)["violation"]["became_exceeded"], true);

        s.set_lot_json(r#"{"ring":[[151.001,-33.8],[151.00116,-33.8],[151.00116,-33.80036],[151.001,-33.80036],[151.001,-33.8]]}"#)
            .unwrap();
        let v = eval(&mut s);
        assert_eq!(v["exceeds"], true);
        assert_eq!(v["violation"]["became_exceeded"], true);

        s.set_footprint("", 10.5, 14.0);
        assert_eq!(eval(&mut s)["violation"]["became_exceeded"], true);

        // Re-sending the same inputs is not a change.
        s.set_footprint("", 10.5, 14.0);
        assert_eq!(eval(&mut s)["violation"]["became_exceeded"], false);
    }

    #[test]
    fn invalid_inputs_are_rejected_or_reported() {
        let mut s = ready();
        assert!(s.set_lot_json("{\"ring\": 3}").is_err());
        assert!(s.snap_rotation(45.0).is_err());
        assert!(s.set_nominal_sides_json("[1, 2]").is_err());
        s.set_nominal_sides_json("null").unwrap();
        assert!(s.nominal_sides.is_none());

        s.set_lot_json(r#"{"ring":[[0,0],[1,1],[0,0]]}"#).unwrap();
        assert_eq!(s.lot_id, DEFAULT_LOT_ID);
        let v = eval(&mut s);
        assert_eq!(v["error"]["kind"], "invalid_geometry");
    }

    #[test]
    fn fsr_and_side_labels_flow_through() {
        let mut s = ready();
        s.fsr = Some(FsrTarget::Ratio(0.5));
        s.set_nominal_sides_json("[40, 15, 40, 15]").unwrap();
        let v = eval(&mut s);
        let lot = v["lot_area_m2"].as_f64().unwrap();
        let fsr = v["fsr_boundary"]["area_m2"].as_f64().unwrap();
        assert!((fsr - lot * 0.5).abs() < lot * 1e-6);
        assert_eq!(v["sides"]["nominal"][0], 15.0);
    }

    #[test]
    fn clear_lot_drops_inputs() {
        let mut s = ready();
        s.clear_lot();
        assert!(s.input().is_none());
        s.clear_footprint();
        assert!(s.footprint.is_none());
    }
}
