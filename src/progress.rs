// src/progress.rs
//! Stage progress on stderr using indicatif

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner showing how many queries the current stage has worked through
///
/// Clones share the same spinner. Banners are printed through
/// [`ProgressIndicator::banner`] so they never interleave with a redraw.
#[derive(Clone)]
pub struct ProgressIndicator {
    spinner: Option<ProgressBar>,
}

impl ProgressIndicator {
    /// Create a new progress indicator
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(100));

        Self {
            spinner: Some(spinner),
        }
    }

    pub fn disabled() -> Self {
        Self { spinner: None }
    }

    /// Set the status message
    pub fn set_message(&self, msg: impl Into<String>) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(msg.into());
        }
    }

    /// Print a `[+]` banner line to stderr
    pub fn banner(&self, msg: &str) {
        self.suspend(|| eprintln!("{} {}", "[+]".green().bold(), msg));
    }

    /// Temporarily suspend the spinner to print other output
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if let Some(ref spinner) = self.spinner {
            spinner.suspend(f)
        } else {
            f()
        }
    }

    /// Finish and clear the progress indicator
    pub fn finish(&self) {
        if let Some(ref spinner) = self.spinner {
            spinner.finish_and_clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.spinner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_indicator_disabled() {
        let progress = ProgressIndicator::new(false);
        assert!(!progress.is_enabled());

        // Should not panic
        progress.set_message("test");
        progress.banner("Stage 1: test");
        assert_eq!(progress.suspend(|| 7), 7);
        progress.finish();
    }

    #[test]
    fn test_progress_indicator_enabled() {
        let progress = ProgressIndicator::new(true);
        assert!(progress.is_enabled());

        progress.set_message("Stage 1: 3/10 queries");
        let clone = progress.clone();
        clone.banner("Stage 1: test");
        progress.finish();
    }
}
