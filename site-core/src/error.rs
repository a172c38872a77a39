use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`SiteError`], suitable for UI decisions
/// (which overlay to omit, whether to show a data warning).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidGeometry,
    DegenerateGeometry,
    DataMismatch,
}

/// Every failure the geometry core can report. All of them are recoverable:
/// the caller drops the affected overlay and keeps going.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SiteError {
    /// Malformed input ring or parameters (unclosed, too few vertices,
    /// self-intersecting, non-finite values).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A derived polygon collapsed (setbacks too large, parallel edges,
    /// zero-area source for scaling).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    /// Nominal side lengths could not be matched to the measured edges.
    #[error(
        "side lengths do not match: edge {edge} measured {actual:.2} m, nominal {nominal:.2} m (relative error {relative_error:.2})"
    )]
    DataMismatch {
        edge: usize,
        nominal: f64,
        actual: f64,
        relative_error: f64,
    },
}

impl SiteError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SiteError::InvalidGeometry(msg.into())
    }

    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        SiteError::DegenerateGeometry(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SiteError::InvalidGeometry(_) => ErrorKind::InvalidGeometry,
            SiteError::DegenerateGeometry(_) => ErrorKind::DegenerateGeometry,
            SiteError::DataMismatch { .. } => ErrorKind::DataMismatch,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
