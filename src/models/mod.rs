//! Data models.

pub mod config;
pub mod job;
pub mod media;
pub mod run;
