// src/blocklist.rs
//! Suffixes of hostnames that never count as discoveries
//!
//! Certificates for most targets also list CA and CDN infrastructure
//! hostnames; these are filtered out before anything is accumulated.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Suffixes blocked on every run
pub const DEFAULT_BLOCKED_SUFFIXES: &[&str] = &[
    "cloudflaressl.com",
    "cloudflare.com",
    "pki.goog",
    "sectigo.com",
    "digicert.com",
    "comodoca.com",
    "usertrust.com",
    "godaddy.com",
    "hydrantid.com",
    "globalsign.com",
];

/// Immutable set of blocked domain suffixes
///
/// Built once at startup and then only read, so it can be shared freely
/// between workers.
#[derive(Debug, Clone)]
pub struct Blocklist {
    suffixes: Vec<String>,
}

impl Blocklist {
    /// Blocklist without the built-in defaults
    pub fn empty() -> Self {
        Self {
            suffixes: Vec::new(),
        }
    }

    /// Add suffixes, skipping blanks and duplicates
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for suffix in suffixes {
            let suffix = suffix.as_ref().trim();
            if !suffix.is_empty() && !self.suffixes.iter().any(|s| s == suffix) {
                self.suffixes.push(suffix.to_string());
            }
        }
        self
    }

    /// Add the suffixes listed in a file (one per line)
    ///
    /// A missing or unreadable file is not fatal: a warning is logged and the
    /// blocklist is returned unchanged. Lines that are not valid UTF-8 are
    /// skipped on their own.
    pub fn with_file(self, path: &Path) -> Self {
        match fs::read(path) {
            Ok(content) => {
                let lines = content
                    .split(|b| *b == b'\n')
                    .enumerate()
                    .filter_map(|(n, line)| match std::str::from_utf8(line) {
                        Ok(line) => Some(line),
                        Err(_) => {
                            warn!("Skipping non UTF-8 line {} in {}", n + 1, path.display());
                            None
                        }
                    });
                let before = self.len();
                let merged = self.with_suffixes(lines);
                debug!(
                    "Loaded {} additional blocked suffixes from {}",
                    merged.len() - before,
                    path.display()
                );
                merged
            }
            Err(e) => {
                warn!("Could not read blocklist file '{}': {}", path.display(), e);
                self
            }
        }
    }

    /// True if `domain` equals a blocked suffix or ends with `.` + suffix
    pub fn is_blocked(&self, domain: &str) -> bool {
        self.suffixes.iter().any(|suffix| {
            domain == suffix
                || domain
                    .strip_suffix(suffix.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::empty().with_suffixes(DEFAULT_BLOCKED_SUFFIXES)
    }
}
