// src/input.rs
//! Domains piped in on stdin

use anyhow::{Context, Result};
use std::io::{self, BufRead};
use tracing::debug;

/// Append the domains read from stdin to `flag_domains`
///
/// Stdin is only read when it is not an interactive terminal.
pub fn gather_domains(flag_domains: Vec<String>) -> Result<Vec<String>> {
    let mut domains = flag_domains;

    if !is_terminal::is_terminal(io::stdin()) {
        debug!("Reading domains from stdin...");
        let piped = read_domains(io::stdin().lock()).context("Failed to read domains from stdin")?;
        debug!("Read {} domains from stdin", piped.len());
        domains.extend(piped);
    }

    Ok(domains)
}

/// One domain per line; surrounding whitespace and blank lines are dropped
pub fn read_domains<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut domains = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let domain = line.trim();
        if !domain.is_empty() {
            domains.push(domain.to_string());
        }
    }
    Ok(domains)
}
