//! Failure report written at the end of a run

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Marker appended to the serialized report when any device timed out
pub const TIMEOUT_SENTINEL: &str = "TIMEOUT";

/// Why a device is in the report
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Failure {
    /// The device reported the failure terminal state
    Device(String),

    /// The device never reached a terminal state within the polling budget
    Timeout(String),
}

impl Failure {
    pub fn device_id(&self) -> &str {
        match self {
            Failure::Device(id) | Failure::Timeout(id) => id,
        }
    }
}

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(Vec<String>),
    TimedOut(Vec<String>),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Deployment completed successfully"),
            Outcome::Failed(ids) => write!(f, "Unable to complete deployment: {:?}", ids),
            Outcome::TimedOut(ids) => write!(f, "Deployment timed out: {:?}", ids),
        }
    }
}

/// Devices that failed or timed out, in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureReport {
    entries: Vec<Failure>,
}

impl FailureReport {
    pub fn new(entries: Vec<Failure>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, failure: Failure) {
        self.entries.push(failure);
    }

    pub fn entries(&self) -> &[Failure] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed_devices(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            Failure::Device(id) => Some(id.as_str()),
            Failure::Timeout(_) => None,
        })
    }

    pub fn timed_out_devices(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            Failure::Timeout(id) => Some(id.as_str()),
            Failure::Device(_) => None,
        })
    }

    pub fn has_timeout(&self) -> bool {
        self.timed_out_devices().next().is_some()
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.entries.iter().any(|e| e.device_id() == device_id)
    }

    /// The report as written to disk: failed ids, timed-out ids, then the sentinel
    pub fn to_wire(&self) -> Vec<String> {
        let mut wire: Vec<String> = self
            .failed_devices()
            .chain(self.timed_out_devices())
            .map(str::to_string)
            .collect();
        if self.has_timeout() {
            wire.push(TIMEOUT_SENTINEL.to_string());
        }
        wire
    }

    /// Explicit failures take precedence over timeouts
    pub fn outcome(&self) -> Outcome {
        if self.is_empty() {
            Outcome::Success
        } else if self.failed_devices().next().is_some() {
            Outcome::Failed(self.to_wire())
        } else {
            Outcome::TimedOut(self.timed_out_devices().map(str::to_string).collect())
        }
    }
}

impl Serialize for FailureReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = self.to_wire();
        let mut seq = serializer.serialize_seq(Some(wire.len()))?;
        for id in &wire {
            seq.serialize_element(id)?;
        }
        seq.end()
    }
}
