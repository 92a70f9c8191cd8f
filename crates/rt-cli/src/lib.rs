//! RescueTime report CLI library.
//!
//! This crate provides the CLI interface over `rt-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ReportArgs, ReportKindArg};
pub use config::Config;
