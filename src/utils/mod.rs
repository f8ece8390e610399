//! Utility modules

pub mod memory_service;
pub mod validation;

pub use memory_service::*;
pub use validation::*;
