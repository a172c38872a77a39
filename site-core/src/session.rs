use serde::{Deserialize, Serialize};

use crate::config::Tolerances;
use crate::containment::{ViolationMonitor, ViolationTransition};
use crate::error::Result;
use crate::pipeline::{SiteInput, SiteReport, evaluate};

/// Identifies one (lot, footprint) pairing. Violation tracking restarts
/// whenever it changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub lot_id: String,
    pub footprint_id: String,
}

impl SessionKey {
    pub fn new(lot_id: impl Into<String>, footprint_id: impl Into<String>) -> Self {
        SessionKey {
            lot_id: lot_id.into(),
            footprint_id: footprint_id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionUpdate {
    #[serde(flatten)]
    pub report: SiteReport,
    pub violation: ViolationTransition,
}

/// Evaluates inputs on every change and turns the per-frame containment
/// verdict into one-shot violation notifications.
#[derive(Clone, Debug, Default)]
pub struct SiteSession {
    monitor: ViolationMonitor<SessionKey>,
    tolerances: Tolerances,
}

impl SiteSession {
    pub fn new(tolerances: Tolerances) -> Self {
        SiteSession {
            monitor: ViolationMonitor::new(),
            tolerances,
        }
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    pub fn set_tolerances(&mut self, tolerances: Tolerances) {
        self.tolerances = tolerances;
    }

    pub fn evaluate(&mut self, key: &SessionKey, input: &SiteInput) -> Result<SessionUpdate> {
        let report = evaluate(input, &self.tolerances)?;
        let violation = self.monitor.observe(key, report.exceeds.unwrap_or(false));
        if violation.became_exceeded {
            log::info!(
                "footprint {} no longer fits lot {}",
                key.footprint_id,
                key.lot_id
            );
        }
        Ok(SessionUpdate { report, violation })
    }

    /// Drops violation history, e.g. when the lot is deselected.
    pub fn reset(&mut self) {
        self.monitor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::HouseFootprintSpec;
    use crate::offset::SetbackSpec;
    use crate::ring::ring_from_pairs;

    fn input(rotation_deg: f64) -> SiteInput {
        // About 15 m wide and 40 m deep.
        let lot = ring_from_pairs(&[
            [151.000_000, -33.800_360],
            [151.000_162, -33.800_360],
            [151.000_162, -33.800_000],
            [151.000_000, -33.800_000],
            [151.000_000, -33.800_360],
        ]);
        SiteInput {
            setbacks: SetbackSpec::new(6.0, 1.0, 1.0),
            footprint: Some(HouseFootprintSpec::new(11.0, 20.0)),
            rotation_deg,
            ..SiteInput::new(lot)
        }
    }

    #[test]
    fn dragging_rotation_notifies_once() {
        let mut s = SiteSession::default();
        let key = SessionKey::new("lot-7", "design-3");
        let mut onsets = 0;
        for deg in 0..=90 {
            let u = s.evaluate(&key, &input(deg as f64)).unwrap();
            if u.violation.became_exceeded {
                onsets += 1;
            }
        }
        assert_eq!(onsets, 1);
        let last = s.evaluate(&key, &input(90.0)).unwrap();
        assert_eq!(last.report.exceeds, Some(true));
        assert!(!last.violation.became_exceeded);
    }

    #[test]
    fn switching_footprint_restarts_tracking() {
        let mut s = SiteSession::default();
        let a = SessionKey::new("lot-7", "design-3");
        let b = SessionKey::new("lot-7", "design-4");
        assert!(s.evaluate(&a, &input(90.0)).unwrap().violation.became_exceeded);
        let first_b = s.evaluate(&b, &input(0.0)).unwrap();
        assert!(!first_b.violation.became_exceeded && !first_b.violation.became_clear);
        assert!(s.evaluate(&b, &input(90.0)).unwrap().violation.became_exceeded);
    }
}
