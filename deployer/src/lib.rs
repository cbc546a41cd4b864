//! Greengrass fleet deployment tooling
//!
//! Reconciles fleet deployments against the Greengrass V2 API and renders
//! the delivery pipeline stack.

pub mod app;
pub mod authn;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod stack;
pub mod storage;
pub mod utils;
pub mod workers;
