//! Geometry core for testing whether a house footprint fits a lot.
//!
//! A lot ring in `[lon, lat]` is projected onto a local metric plane, inset
//! by front/side/rear setbacks, optionally scaled down to an FSR area target,
//! and a rotated rectangular footprint is placed at the result's centroid
//! and tested for containment. Everything is a pure function of its inputs
//! except [`ViolationTracker`] / [`SiteSession`], which remember the previous
//! containment verdict to emit one-shot violation notifications.

pub mod config;
pub mod constants;
pub mod containment;
pub mod error;
pub mod footprint;
pub mod offset;
pub mod pipeline;
pub mod projection;
pub mod ring;
pub mod scale;
pub mod scenario;
pub mod session;
pub mod sides;

pub use config::Tolerances;
pub use containment::{
    ViolationMonitor, ViolationTracker, ViolationTransition, exceeds, exceeds_with_tolerance,
};
pub use error::{ErrorKind, Result, SiteError};
pub use footprint::{HouseFootprintSpec, RotationPreset, place, snap_to_preset, wrap_degrees};
pub use offset::{SetbackSpec, inset};
pub use pipeline::{FsrTarget, Issue, Overlay, SiteInput, SiteReport, Stage, evaluate};
pub use projection::{LocalProjection, project};
pub use scale::{centroid_of, scale_to_area};
pub use scenario::SiteScenario;
pub use session::{SessionKey, SessionUpdate, SiteSession};
pub use sides::{SideAssignment, assign_lengths, edge_lengths, map_lengths, map_lengths_or_identity};
