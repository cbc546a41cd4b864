//! Convergence poller

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::deploy::api::FleetApi;
use crate::deploy::convergence::Convergence;
use crate::errors::FleetError;
use crate::models::report::FailureReport;
use crate::storage::params::PollingParams;

/// Poller options
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of device listings
    pub max_iterations: u32,

    /// Delay between listings
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            interval: Duration::from_secs(1),
        }
    }
}

impl From<PollingParams> for Options {
    fn from(params: PollingParams) -> Self {
        Self {
            max_iterations: params.max_iterations,
            interval: params.interval(),
        }
    }
}

/// Poll the devices of `thing_group_arn` until none is pending or the
/// iteration budget runs out. Devices still pending at the end are reported
/// as timeouts.
pub async fn run<S, F>(
    options: &Options,
    api: &dyn FleetApi,
    thing_group_arn: &str,
    sleep_fn: S,
) -> Result<FailureReport, FleetError>
where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let max_iterations = options.max_iterations.max(1);
    info!(
        "Polling devices of {} (up to {} iterations, every {:?})",
        thing_group_arn, max_iterations, options.interval
    );

    let mut state = Convergence::new();
    for iteration in 1..=max_iterations {
        let listing = api.list_core_devices(thing_group_arn).await?;
        state = state.next(&listing);

        for device in &listing {
            info!(
                "[{}/{}] {}: {}",
                iteration, max_iterations, device.core_device_thing_name, device.status
            );
        }

        if state.is_converged() {
            info!(
                "Devices converged after {} iteration(s): {} done, {} failed",
                iteration,
                state.done().count(),
                state.failed().count()
            );
            return Ok(state.into_report());
        }

        debug!("{} device(s) still pending", state.pending().count());
        if iteration < max_iterations {
            sleep_fn(options.interval).await;
        }
    }

    warn!(
        "Polling budget exhausted with pending devices: {:?}",
        state.pending().collect::<Vec<_>>()
    );
    Ok(state.into_report())
}
