//! Library path generators.

pub mod destination;
