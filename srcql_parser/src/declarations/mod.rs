//! Per-parse declaration tables.

pub mod tables;

pub use tables::{DeclarationError, DeclarationTables};
