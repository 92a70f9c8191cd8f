//! Levels command listing productivity scores.

use std::io::Write;

use anyhow::Result;
use rt_core::ReportClient;

pub fn run<W: Write>(writer: &mut W) -> Result<()> {
    for level in ReportClient::productivity_levels().iter().rev() {
        writeln!(writer, "{}: {}", level.score(), level.label())?;
    }
    Ok(())
}
