//! Request authentication

pub mod container;
pub mod credentials;
pub mod sigv4;
