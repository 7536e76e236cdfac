//! Glue between the command line and the library crates.
//!
//! Resolves where the input tables live and loads them with progress
//! reporting.

pub(crate) mod config;
pub(crate) mod data_pipeline;
