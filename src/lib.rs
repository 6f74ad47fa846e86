//! Plex Sorter Library
//!
//! Renames and relocates movie and TV episode files into a Plex-style
//! library, looking titles up on TMDB or OMDb.
//!
//! The engine is driven through [`core::runner::start_run`], which returns a
//! [`core::runner::RunHandle`] for stop requests and disambiguation choices,
//! plus a stream of [`models::run::RunEvent`]s.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
