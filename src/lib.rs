//! ansiweather library
//!
//! Fetches current conditions for one configured location, caches the raw
//! response in a multi-process-safe file, and renders a colorized status line.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod logging;
pub mod orchestrator;

pub use error::Error;
