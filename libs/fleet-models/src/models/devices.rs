use std::fmt;

use serde::{Deserialize, Serialize};

/// Health reported for a core device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CoreDeviceStatus {
    Healthy,
    Unhealthy,
    InProgress,
    Other(String),
}

impl CoreDeviceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CoreDeviceStatus::Healthy => "HEALTHY",
            CoreDeviceStatus::Unhealthy => "UNHEALTHY",
            CoreDeviceStatus::InProgress => "IN_PROGRESS",
            CoreDeviceStatus::Other(s) => s,
        }
    }
}

impl From<String> for CoreDeviceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HEALTHY" => CoreDeviceStatus::Healthy,
            "UNHEALTHY" => CoreDeviceStatus::Unhealthy,
            "IN_PROGRESS" => CoreDeviceStatus::InProgress,
            _ => CoreDeviceStatus::Other(s),
        }
    }
}

impl From<CoreDeviceStatus> for String {
    fn from(status: CoreDeviceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for CoreDeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of a `ListCoreDevices` page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreDevice {
    pub core_device_thing_name: String,
    pub status: CoreDeviceStatus,

    #[serde(default)]
    pub last_status_update_timestamp: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoreDevicesResponse {
    #[serde(default)]
    pub core_devices: Vec<CoreDevice>,

    #[serde(default)]
    pub next_token: Option<String>,
}
