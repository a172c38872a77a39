use serde::{Deserialize, Serialize};
use site_core::{ErrorKind, SiteError};

/// Lot selected on the map: an optional parcel id and its closed
/// `[lon, lat]` ring.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LotPayload {
    #[serde(default)]
    pub id: Option<String>,
    pub ring: Vec<[f64; 2]>,
}

/// Returned by `evaluate` in place of a report when nothing can be drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl ErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        ErrorBody {
            error: ErrorDetail {
                kind: None,
                message: message.into(),
            },
        }
    }
}

impl From<&SiteError> for ErrorBody {
    fn from(e: &SiteError) -> Self {
        ErrorBody {
            error: ErrorDetail {
                kind: Some(e.kind()),
                message: e.to_string(),
            },
        }
    }
}
