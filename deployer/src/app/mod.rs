//! Command entry points

pub mod options;
pub mod run;
