//! Command-line driver for the PMO builder.

#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod overrides_file;
pub mod summary;
pub mod types;
