//! Deployment reconciliation

pub mod api;
pub mod builder;
pub mod convergence;
pub mod registry;
pub mod submit;
