//! Core types and constants shared by the driver boundary and the wrappers

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
