//! Core business logic modules.

pub mod aggregator;
pub mod cache;
pub mod gate;
pub mod normalizer;
pub mod placement;
pub mod query;
pub mod reporter;
pub mod runner;
pub mod scanner;
pub mod show_folder;
