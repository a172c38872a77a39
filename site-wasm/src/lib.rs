//! Browser bindings for the lot/footprint geometry core.
//!
//! The map surface pushes inputs through the setters and calls [`evaluate`]
//! after every change; the result is a JSON string carrying the overlays as
//! `[lon, lat]` rings, the containment verdict and the violation transition.

use site_core::{FsrTarget, SetbackSpec};
use wasm_bindgen::prelude::*;

pub mod constants;
pub mod models;
pub mod state;
pub mod utils;

use state::with_state;

fn js_err(e: String) -> JsValue {
    JsValue::from_str(&e)
}

#[wasm_bindgen(start)]
pub fn start() {
    utils::init_logging();
}

/// `{"id": "...", "ring": [[lon, lat], ...]}`
#[wasm_bindgen]
pub fn set_lot(json: &str) -> Result<(), JsValue> {
    with_state(|s| s.set_lot_json(json)).map_err(js_err)
}

#[wasm_bindgen]
pub fn clear_lot() {
    with_state(|s| s.clear_lot());
}

#[wasm_bindgen]
pub fn set_setbacks(front: f64, side: f64, rear: f64) {
    with_state(|s| s.setbacks = SetbackSpec::new(front, side, rear));
}

#[wasm_bindgen]
pub fn set_fsr_area(area_m2: f64) {
    with_state(|s| s.fsr = Some(FsrTarget::AreaM2(area_m2)));
}

#[wasm_bindgen]
pub fn set_fsr_ratio(ratio: f64) {
    with_state(|s| s.fsr = Some(FsrTarget::Ratio(ratio)));
}

#[wasm_bindgen]
pub fn clear_fsr() {
    with_state(|s| s.fsr = None);
}

#[wasm_bindgen]
pub fn set_footprint(id: &str, width: f64, depth: f64) {
    with_state(|s| s.set_footprint(id, width, depth));
}

#[wasm_bindgen]
pub fn clear_footprint() {
    with_state(|s| s.clear_footprint());
}

/// Returns the stored angle, wrapped into `[0, 360)`.
#[wasm_bindgen]
pub fn set_rotation(degrees: f64) -> f64 {
    with_state(|s| s.set_rotation(degrees))
}

#[wasm_bindgen]
pub fn snap_rotation(preset_degrees: f64) -> Result<f64, JsValue> {
    with_state(|s| s.snap_rotation(preset_degrees)).map_err(js_err)
}

/// `[l0, l1, l2, l3]` in meters, or `null` to clear.
#[wasm_bindgen]
pub fn set_nominal_sides(json: &str) -> Result<(), JsValue> {
    with_state(|s| s.set_nominal_sides_json(json)).map_err(js_err)
}

#[wasm_bindgen]
pub fn set_tolerances(json: &str) -> Result<(), JsValue> {
    with_state(|s| s.set_tolerances_json(json)).map_err(js_err)
}

#[wasm_bindgen]
pub fn evaluate() -> String {
    with_state(|s| s.evaluate_json())
}
