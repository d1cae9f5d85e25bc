//! wizgen command layer - exposed as a library for testing

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
pub use wizgen_logger as logger;
