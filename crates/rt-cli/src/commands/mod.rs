//! CLI subcommand implementations.

pub mod check;
pub mod levels;
pub mod report;
