//! Greengrass V2 API models
//!
//! Request and response shapes for the subset of the fleet management API
//! used by the deployment reconciler. Field names follow the service's
//! camelCase JSON.

pub mod models;

pub use models::*;
