//! Parameters, settings and output locations

pub mod layout;
pub mod params;
pub mod settings;
