//! API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod components;
mod deployments;
mod devices;

pub use components::*;
pub use deployments::*;
pub use devices::*;

/// Error body returned by the service on non-2xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

/// Convert a service epoch timestamp (seconds, possibly fractional)
pub fn epoch_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    let whole = secs.trunc() as i64;
    let nanos = (secs.fract() * 1e9).round() as u32;
    DateTime::from_timestamp(whole, nanos.min(999_999_999))
}
