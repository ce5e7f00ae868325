//! Command implementations.

pub mod doctor;
pub mod version;
