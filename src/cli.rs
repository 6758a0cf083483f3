// src/cli.rs
use clap::Parser;

/// crtx: subdomain discovery through certificate transparency
///
/// Searches crt.sh for certificates issued to the given domains (or
/// organization) and prints every hostname they cover. Domains can also be
/// piped in on stdin, one per line.
#[derive(Parser, Debug, Clone)]
#[command(name = "crtx")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:
  cat domains.txt | crtx
  crtx -d example.com
  crtx -d example.com -d anotherexample.com
  crtx -o \"Example Inc\"
  crtx -r -d example.com
  crtx -v -d example.com")]
pub struct Cli {
    // ===== Targets =====
    /// Domain to search for (can be specified multiple times)
    #[arg(short = 'd', long = "domain")]
    pub domains: Vec<String>,

    /// Organization name to search for
    #[arg(short = 'o', long = "org")]
    pub org: Option<String>,

    /// Recursive search: pivot on discovered organizations and subdomains (requires domains)
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    // ===== Performance =====
    /// Number of concurrent workers [default: 50]
    #[arg(short = 'c', long = "concurrency")]
    pub concurrency: Option<usize>,

    // ===== Filtering =====
    /// File containing additional domain suffixes to block (one per line)
    #[arg(long = "blocklist-file", visible_alias = "bf")]
    pub blocklist_file: Option<String>,

    // ===== Configuration =====
    /// Path to TOML config file
    #[arg(long = "config")]
    pub config: Option<String>,

    // ===== Display & Logging =====
    /// Disable progress indicator
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Verbose logging (set log level to debug)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Quiet logging (set log level to error)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Cli {
    /// Validate flag combinations and return errors for invalid usage
    ///
    /// Domain/organization combinations are checked later, once stdin has
    /// been read.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == Some(0) {
            anyhow::bail!("--concurrency must be greater than 0");
        }

        // Verbose and quiet are mutually exclusive
        if self.verbose && self.quiet {
            anyhow::bail!("Cannot specify both --verbose and --quiet");
        }

        Ok(())
    }

    /// Log level forced by flags, if any
    pub fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["crtx"]);
        assert!(cli.domains.is_empty());
        assert_eq!(cli.org, None);
        assert!(!cli.recursive);
        assert_eq!(cli.concurrency, None);
        assert_eq!(cli.blocklist_file, None);
        assert_eq!(cli.config, None);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_repeated_domains() {
        let cli = Cli::parse_from(["crtx", "-d", "a.com", "--domain", "b.com", "-d", "c.com"]);
        assert_eq!(cli.domains, vec!["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["crtx", "-o", "Example Inc", "-c", "10", "-r", "-v"]);
        assert_eq!(cli.org, Some("Example Inc".to_string()));
        assert_eq!(cli.concurrency, Some(10));
        assert!(cli.recursive);
        assert!(cli.verbose);
    }

    #[test]
    fn test_blocklist_file_alias() {
        let cli = Cli::parse_from(["crtx", "--bf", "blocked.txt"]);
        assert_eq!(cli.blocklist_file, Some("blocked.txt".to_string()));

        let cli = Cli::parse_from(["crtx", "--blocklist-file", "other.txt"]);
        assert_eq!(cli.blocklist_file, Some("other.txt".to_string()));
    }

    #[test]
    fn test_zero_concurrency_invalid() {
        let cli = Cli::parse_from(["crtx", "-c", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_non_numeric_concurrency_rejected() {
        assert!(Cli::try_parse_from(["crtx", "-c", "lots"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_invalid() {
        let cli = Cli::parse_from(["crtx", "--verbose", "--quiet"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_log_level_verbose() {
        let cli = Cli::parse_from(["crtx", "--verbose"]);
        assert_eq!(cli.log_level(), Some("debug"));
    }

    #[test]
    fn test_log_level_quiet() {
        let cli = Cli::parse_from(["crtx", "--quiet"]);
        assert_eq!(cli.log_level(), Some("error"));
    }

    #[test]
    fn test_log_level_default() {
        let cli = Cli::parse_from(["crtx"]);
        assert_eq!(cli.log_level(), None);
    }
}
