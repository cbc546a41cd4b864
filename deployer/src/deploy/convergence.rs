//! Device convergence bookkeeping
//!
//! Each poll produces a full listing of the target's devices. `next`
//! partitions that listing into done, failed and pending devices, carrying
//! over devices absent from the listing unchanged. Done devices are final;
//! a failed device that later reports success or goes back in progress
//! leaves the failed set.

use fleet_models::{CoreDevice, CoreDeviceStatus};

use crate::models::report::{Failure, FailureReport};

/// Where a device currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Done,
    Failed,
    Pending,
}

impl From<&CoreDeviceStatus> for Membership {
    fn from(status: &CoreDeviceStatus) -> Self {
        match status {
            CoreDeviceStatus::Healthy => Membership::Done,
            CoreDeviceStatus::Unhealthy => Membership::Failed,
            CoreDeviceStatus::InProgress | CoreDeviceStatus::Other(_) => Membership::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedDevice {
    id: String,
    membership: Membership,
}

/// Convergence state after zero or more polls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Convergence {
    /// Devices in first-seen order
    devices: Vec<TrackedDevice>,
    polls: u32,
}

impl Convergence {
    pub fn new() -> Self {
        Self::default()
    }

    /// State after observing one full listing
    pub fn next(&self, listing: &[CoreDevice]) -> Convergence {
        let mut devices = self.devices.clone();

        for device in listing {
            let membership = Membership::from(&device.status);
            match devices
                .iter_mut()
                .find(|d| d.id == device.core_device_thing_name)
            {
                Some(tracked) if tracked.membership == Membership::Done => {}
                Some(tracked) => tracked.membership = membership,
                None => devices.push(TrackedDevice {
                    id: device.core_device_thing_name.clone(),
                    membership,
                }),
            }
        }

        Convergence {
            devices,
            polls: self.polls + 1,
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn membership(&self, device_id: &str) -> Option<Membership> {
        self.devices
            .iter()
            .find(|d| d.id == device_id)
            .map(|d| d.membership)
    }

    fn ids(&self, membership: Membership) -> impl Iterator<Item = &str> {
        self.devices
            .iter()
            .filter(move |d| d.membership == membership)
            .map(|d| d.id.as_str())
    }

    pub fn done(&self) -> impl Iterator<Item = &str> {
        self.ids(Membership::Done)
    }

    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.ids(Membership::Failed)
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.ids(Membership::Pending)
    }

    /// At least one listing was seen and nothing is left in progress
    pub fn is_converged(&self) -> bool {
        self.polls > 0 && self.pending().next().is_none()
    }

    /// Failed devices, plus every still-pending device as a timeout
    pub fn into_report(self) -> FailureReport {
        let mut report = FailureReport::default();
        for id in self.failed() {
            report.push(Failure::Device(id.to_string()));
        }
        for id in self.pending() {
            report.push(Failure::Timeout(id.to_string()));
        }
        report
    }
}
