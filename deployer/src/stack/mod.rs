//! Delivery pipeline stack definition

pub mod pipeline;
