//! Fleet management API client

pub mod client;
pub mod components;
pub mod deployments;
pub mod devices;
