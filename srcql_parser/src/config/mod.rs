//! Compile-time configuration for the parser.
//!
//! All resource bounds are fixed at compile time; runtime preferences exist
//! only for logging and live in `crate::logging::config`.

pub mod constants;

pub use constants::compile_time;
