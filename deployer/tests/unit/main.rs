//! Integration tests against an in-memory fleet

mod fake_fleet;
mod test_deploy;
mod test_poller;
mod test_registry;
