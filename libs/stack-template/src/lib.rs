//! Provisioning template models
//!
//! A small, typed subset of the CloudFormation template format: resources,
//! intrinsic references and the CodePipeline stage/action shapes.

pub mod models;

pub use models::*;
