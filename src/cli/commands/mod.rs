//! CLI command implementations.

pub mod check;
pub mod sort;
