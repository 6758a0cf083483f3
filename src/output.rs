// src/output.rs
//! Hostname output, one per line

use crate::progress::ProgressIndicator;
use anyhow::{Context, Result};
use std::io::{self, Write};

/// Writes discovered hostnames, keeping clear of the stderr spinner
pub struct HostnameWriter<W: Write> {
    writer: W,
    progress: ProgressIndicator,
    written: usize,
}

impl HostnameWriter<io::Stdout> {
    /// Create a new HostnameWriter that writes to stdout
    pub fn stdout(progress: ProgressIndicator) -> Self {
        Self::new(io::stdout(), progress)
    }
}

impl<W: Write> HostnameWriter<W> {
    pub fn new(writer: W, progress: ProgressIndicator) -> Self {
        Self {
            writer,
            progress,
            written: 0,
        }
    }

    /// Write one hostname line
    pub fn emit(&mut self, hostname: &str) -> Result<()> {
        let writer = &mut self.writer;
        self.progress
            .suspend(|| writeln!(writer, "{}", hostname))
            .context("Failed to write hostname")?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush output")?;
        Ok(())
    }

    /// Number of lines written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
