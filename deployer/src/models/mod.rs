//! Run outcome models

pub mod report;
