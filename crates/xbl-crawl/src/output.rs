//! Operator-facing output: start-up banner and end-of-run summary.
//!
//! Progress, warnings and errors during the crawl go through `tracing`; this
//! module only covers what is printed before and after it.
//!
//! Semantic Color Theme:
//!   - Success:  green   (graph exhausted)
//!   - Warning:  yellow  (skipped nodes)
//!   - Error:    red     (rate-limit abort)
//!   - Info:     cyan    (gamertags, counts)
//!   - Accent:   magenta (banner)

use crate::crawler::{CrawlOutcome, CrawlReport};
use colored::Colorize;
use std::env;
use std::io::{self, Write};

const BANNER: &str = r"
██╗  ██╗██████╗ ██╗
╚██╗██╔╝██╔══██╗██║
 ╚███╔╝ ██████╔╝██║
 ██╔██╗ ██╔══██╗██║
██╔╝ ██╗██████╔╝███████╗
╚═╝  ╚═╝╚═════╝ ╚══════╝
";

/// Configuration for output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` with explicit values.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `XBL_CRAWL_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("NO_COLOR").ok().as_deref(),
            env::var("XBL_CRAWL_COLOR").ok().as_deref(),
        )
    }

    fn from_vars(no_color: Option<&str>, crawl_color: Option<&str>) -> Self {
        let use_colors = no_color.is_none()
            && crawl_color.is_none_or(|v| !matches!(v.to_lowercase().as_str(), "0" | "false"));
        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(true)
    }
}

fn paint(text: &str, config: OutputConfig, style: fn(&str) -> colored::ColoredString) -> String {
    if config.use_colors {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: OutputConfig) -> String {
    paint(text, config, |t| t.green())
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: OutputConfig) -> String {
    paint(text, config, |t| t.yellow())
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: OutputConfig) -> String {
    paint(text, config, |t| t.red())
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: OutputConfig) -> String {
    paint(text, config, |t| t.cyan())
}

/// Write the start-up banner.
pub fn write_banner<W: Write>(out: &mut W, config: OutputConfig) -> io::Result<()> {
    writeln!(out, "{}", paint(BANNER, config, |t| t.magenta().bold()))
}

/// Print the start-up banner to stderr.
pub fn print_banner(config: OutputConfig) {
    // Best effort; a closed stderr is not worth failing the crawl over
    let _ = write_banner(&mut io::stderr().lock(), config);
}

/// Write a human-readable summary of a finished run.
pub fn write_summary<W: Write>(
    out: &mut W,
    report: &CrawlReport,
    config: OutputConfig,
) -> io::Result<()> {
    let headline = match &report.outcome {
        CrawlOutcome::Exhausted => success("Crawl finished: frontier exhausted", config),
        CrawlOutcome::RateLimited { gamertag } => error(
            &format!("Crawl aborted: rate limit hit while expanding {gamertag}. Try again later."),
            config,
        ),
    };
    writeln!(out, "{headline}")?;

    let elapsed = report.elapsed();
    writeln!(
        out,
        "  Expanded:  {}",
        info(&report.expanded.to_string(), config)
    )?;
    writeln!(
        out,
        "  Recorded:  {}",
        info(&report.recorded.to_string(), config)
    )?;
    writeln!(
        out,
        "  Skipped:   {} ({} duplicates)",
        warning(&report.skipped.to_string(), config),
        report.duplicates
    )?;
    writeln!(out, "  Remaining: {}", report.remaining)?;
    writeln!(
        out,
        "  Elapsed:   {}m {:02}s",
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60
    )?;
    Ok(())
}

/// Write the report as pretty-printed JSON.
pub fn write_summary_json<W: Write>(out: &mut W, report: &CrawlReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    writeln!(out, "{json}")
}
