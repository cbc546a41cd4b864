//! Convergence poller tests

use std::cell::RefCell;
use std::future::{ready, Ready};
use std::time::Duration;

use fleet_models::CoreDeviceStatus::{Healthy, InProgress, Other, Unhealthy};
use ggdeploy::models::report::{Failure, FailureReport};
use ggdeploy::workers::poller::{self, Options};

use crate::fake_fleet::{device, FakeFleet, MAIN_ARN};

fn options(max_iterations: u32) -> Options {
    Options {
        max_iterations,
        interval: Duration::from_secs(5),
    }
}

/// Records requested sleeps instead of waiting
#[derive(Default)]
struct Sleeps(RefCell<Vec<Duration>>);

impl Sleeps {
    fn sleep(&self) -> impl Fn(Duration) -> Ready<()> + '_ {
        |duration| {
            self.0.borrow_mut().push(duration);
            ready(())
        }
    }

    fn count(&self) -> usize {
        self.0.borrow().len()
    }
}

#[tokio::test]
async fn test_all_healthy_converges_in_one_iteration() {
    let fleet = FakeFleet::new().with_listings(vec![vec![
        device("core-a", Healthy),
        device("core-b", Healthy),
        device("core-c", Healthy),
    ]]);
    let sleeps = Sleeps::default();

    let report = poller::run(&options(10), &fleet, MAIN_ARN, sleeps.sleep())
        .await
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(fleet.device_polls(), 1);
    assert_eq!(sleeps.count(), 0);
}

#[tokio::test]
async fn test_done_device_is_not_reported_after_relapse() {
    let fleet = FakeFleet::new().with_listings(vec![
        vec![device("core-a", Healthy), device("core-b", InProgress)],
        vec![device("core-a", Unhealthy), device("core-b", InProgress)],
        vec![device("core-a", Healthy), device("core-b", Healthy)],
    ]);
    let sleeps = Sleeps::default();

    let report = poller::run(&options(10), &fleet, MAIN_ARN, sleeps.sleep())
        .await
        .unwrap();

    assert!(!report.contains("core-a"));
    assert!(report.is_empty());
    assert_eq!(fleet.device_polls(), 3);
    assert_eq!(sleeps.count(), 2);
}

#[tokio::test]
async fn test_stuck_device_times_out() {
    let fleet = FakeFleet::new().with_listings(vec![vec![
        device("core-a", Healthy),
        device("core-b", Other("UNKNOWN".to_string())),
    ]]);
    let sleeps = Sleeps::default();

    let report = poller::run(&options(3), &fleet, MAIN_ARN, sleeps.sleep())
        .await
        .unwrap();

    assert_eq!(report.entries(), &[Failure::Timeout("core-b".to_string())]);
    assert_eq!(report.to_wire(), vec!["core-b".to_string(), "TIMEOUT".to_string()]);
    assert_eq!(fleet.device_polls(), 3);
    assert_eq!(sleeps.count(), 2);
    assert!(sleeps.0.borrow().iter().all(|d| *d == Duration::from_secs(5)));
}

#[tokio::test]
async fn test_unhealthy_device_is_reported() {
    let fleet = FakeFleet::new().with_listings(vec![vec![
        device("core-a", Healthy),
        device("core-b", Unhealthy),
    ]]);
    let sleeps = Sleeps::default();

    let report = poller::run(&options(10), &fleet, MAIN_ARN, sleeps.sleep())
        .await
        .unwrap();

    assert_eq!(report, FailureReport::new(vec![Failure::Device("core-b".to_string())]));
    assert!(!report.has_timeout());
}

#[tokio::test]
async fn test_failed_device_can_recover() {
    let fleet = FakeFleet::new().with_listings(vec![
        vec![device("core-a", Unhealthy), device("core-b", InProgress)],
        vec![device("core-a", InProgress), device("core-b", InProgress)],
        vec![device("core-a", Healthy), device("core-b", Healthy)],
    ]);
    let sleeps = Sleeps::default();

    let report = poller::run(&options(10), &fleet, MAIN_ARN, sleeps.sleep())
        .await
        .unwrap();

    assert!(report.is_empty());
}

#[tokio::test]
async fn test_zero_budget_still_lists_once() {
    let fleet = FakeFleet::new().with_listings(vec![vec![device("core-a", InProgress)]]);
    let sleeps = Sleeps::default();

    let report = poller::run(&options(0), &fleet, MAIN_ARN, sleeps.sleep())
        .await
        .unwrap();

    assert_eq!(fleet.device_polls(), 1);
    assert_eq!(sleeps.count(), 0);
    assert!(report.has_timeout());
}
