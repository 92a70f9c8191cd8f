//! Check command for validating the configured API key.

use std::io::Write;

use anyhow::{Context, Result};
use rt_core::ReportClient;

pub fn run<W: Write>(writer: &mut W, client: &ReportClient) -> Result<()> {
    if !client.api_key_present() {
        writeln!(writer, "No API key configured.")?;
        return Ok(());
    }

    let valid = client
        .valid_credentials()
        .context("failed to check API key")?;
    if valid {
        writeln!(writer, "API key is valid.")?;
    } else {
        writeln!(writer, "API key is invalid.")?;
    }
    Ok(())
}
