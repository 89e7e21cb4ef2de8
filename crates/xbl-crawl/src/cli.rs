//! Command-line interface.
//!
//! ```bash
//! xbl-crawl --seed "Major Nelson"
//! xbl-crawl --config crawl.yaml --output data/tags.txt --delay 5
//! xbl-crawl            # prompts for the initial gamertag
//! ```

use crate::config::{ApiKey, CrawlConfig, Settings};
use crate::crawler::{CrawlReport, Crawler};
use crate::domain::Gamertag;
use crate::frontier::Frontier;
use crate::output::{self, OutputConfig};
use crate::remote::XblClient;
use crate::sink::LineFileSink;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Maximum gamertag length accepted from the operator
pub const MAX_GAMERTAG_LENGTH: usize = 64;

/// xbl-crawl - breadth-first crawler for the Xbox Live friends graph
///
/// Starting from one gamertag, discovers friends, then friends of friends,
/// appending every gamertag found to the output file. Requires an OpenXBL
/// API key in `OPENXBL_API_KEY` (or in a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(name = "xbl-crawl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Gamertag to start from (prompted interactively if omitted)
    #[arg(short, long, value_parser = validate_gamertag)]
    pub seed: Option<String>,

    /// Crawl configuration file (defaults to ./xbl-crawl.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Environment file holding OPENXBL_API_KEY
    #[arg(long, default_value = crate::config::DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Output file, overriding the configuration
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seconds to wait after each successful expansion, overriding the configuration
    #[arg(short, long)]
    pub delay: Option<u64>,

    /// Print the end-of-run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Do not print the start-up banner
    #[arg(long)]
    pub no_banner: bool,
}

/// Validate a gamertag given on the command line or at the prompt.
///
/// Surrounding whitespace is trimmed; inner spaces are kept since gamertags
/// may contain them.
pub fn validate_gamertag(s: &str) -> std::result::Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Gamertag cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_GAMERTAG_LENGTH {
        return Err(format!(
            "Gamertag cannot exceed {MAX_GAMERTAG_LENGTH} characters"
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err("Gamertag cannot contain control characters".to_string());
    }
    Ok(trimmed.to_string())
}

/// Ask the operator for the seed gamertag.
pub fn prompt_seed<R: BufRead, W: Write>(input: &mut R, prompt_out: &mut W) -> Result<Gamertag> {
    write!(prompt_out, "Enter initial gamertag: ")?;
    prompt_out.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        anyhow::bail!("No gamertag entered (end of input)");
    }

    let tag = validate_gamertag(&line).map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(Gamertag::new(tag))
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load settings: crawl configuration, CLI overrides, then the credential.
    ///
    /// A missing credential is a startup error, reported before any prompt
    /// or network traffic.
    pub async fn load_settings(&self, working_dir: &Path) -> Result<Settings> {
        let mut crawl = CrawlConfig::discover(self.config.as_deref(), working_dir)
            .await
            .context("Failed to load crawl configuration")?;

        if let Some(output) = &self.output {
            crawl.output_file.clone_from(output);
        }
        if let Some(delay) = self.delay {
            crawl.request_delay_secs = delay;
        }
        crawl.validate()?;

        let env_file = if self.env_file.is_absolute() {
            self.env_file.clone()
        } else {
            working_dir.join(&self.env_file)
        };
        let api_key = ApiKey::load(&env_file)?;

        Ok(Settings::new(api_key, crawl))
    }

    /// Run a crawl end to end.
    ///
    /// Returns the report; a rate-limit abort is a normal outcome, not an
    /// error. Only configuration and persistence failures are errors.
    pub async fn execute(&self) -> Result<CrawlReport> {
        let working_dir = std::env::current_dir()?;
        let output_config = OutputConfig::from_env();

        if !self.no_banner {
            output::print_banner(output_config);
        }

        let settings = self.load_settings(&working_dir).await?;

        let seed = match &self.seed {
            Some(seed) => Gamertag::new(seed.clone()),
            None => prompt_seed(&mut io::stdin().lock(), &mut io::stderr())?,
        };

        let client = XblClient::new(&settings)?;
        let sink = LineFileSink::new(&settings.crawl.output_file);
        let mut crawler = Crawler::new(client.clone(), client, sink)
            .with_request_delay(settings.crawl.request_delay());

        tracing::info!(
            seed = %seed,
            output = %settings.crawl.output_file.display(),
            delay_secs = settings.crawl.request_delay_secs,
            "Starting crawl"
        );

        let mut frontier = Frontier::new(seed);
        let report = crawler.run(&mut frontier).await.with_context(|| {
            format!(
                "Stopping: discovered gamertags could not be saved to {}",
                settings.crawl.output_file.display()
            )
        })?;

        if self.json {
            output::write_summary_json(&mut io::stdout().lock(), &report)?;
        } else {
            output::write_summary(&mut io::stderr().lock(), &report, output_config)?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[rstest]
    #[case::simple("alice", "alice")]
    #[case::trims("  alice \n", "alice")]
    #[case::inner_space("Major Nelson", "Major Nelson")]
    #[case::unicode("Ünïcødé", "Ünïcødé")]
    fn test_validate_gamertag_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_gamertag(input).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("", "empty")]
    #[case::blank("   \n", "empty")]
    #[case::too_long("a".repeat(65), "exceed")]
    #[case::control("ali\u{7}ce", "control")]
    fn test_validate_gamertag_invalid(#[case] input: impl AsRef<str>, #[case] expected: &str) {
        let err = validate_gamertag(input.as_ref()).unwrap_err();
        assert!(
            err.to_lowercase().contains(expected),
            "Expected error to contain '{expected}', got: '{err}'"
        );
    }

    #[test]
    fn test_prompt_seed_reads_line() {
        let mut input = Cursor::new("alice\n");
        let mut prompt = Vec::new();

        let seed = prompt_seed(&mut input, &mut prompt).unwrap();

        assert_eq!(seed, Gamertag::new("alice"));
        assert_eq!(String::from_utf8(prompt).unwrap(), "Enter initial gamertag: ");
    }

    #[test]
    fn test_prompt_seed_rejects_blank() {
        let mut input = Cursor::new("\n");
        let mut prompt = Vec::new();
        assert!(prompt_seed(&mut input, &mut prompt).is_err());
    }

    #[test]
    fn test_prompt_seed_rejects_eof() {
        let mut input = Cursor::new("");
        let mut prompt = Vec::new();
        let err = prompt_seed(&mut input, &mut prompt).unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "xbl-crawl",
            "--seed",
            "Major Nelson",
            "--output",
            "out/tags.txt",
            "--delay",
            "3",
            "--no-banner",
        ])
        .unwrap();

        assert_eq!(cli.seed.as_deref(), Some("Major Nelson"));
        assert_eq!(cli.output, Some(PathBuf::from("out/tags.txt")));
        assert_eq!(cli.delay, Some(3));
        assert!(cli.no_banner);
        assert!(!cli.json);
        assert_eq!(cli.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn test_cli_rejects_blank_seed() {
        assert!(Cli::try_parse_from(["xbl-crawl", "--seed", "  "]).is_err());
    }

    #[tokio::test]
    async fn test_load_settings_applies_overrides() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("keys.env"), "OPENXBL_API_KEY=abc\n").unwrap();
        std::fs::write(
            temp_dir.path().join("xbl-crawl.yaml"),
            "request-delay-secs: 30\noutput-file: from-config.txt\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "xbl-crawl",
            "--env-file",
            "keys.env",
            "--delay",
            "0",
        ])
        .unwrap();
        let settings = cli.load_settings(temp_dir.path()).await;

        // The process environment may already carry a key; either way one is found.
        let settings = settings.unwrap();
        assert_eq!(settings.crawl.request_delay_secs, 0);
        assert_eq!(settings.crawl.output_file, PathBuf::from("from-config.txt"));
    }

    #[tokio::test]
    async fn test_load_settings_rejects_bad_config_before_key_lookup() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("xbl-crawl.yaml"),
            "request-timeout-secs: 0\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from(["xbl-crawl"]).unwrap();
        let err = cli.load_settings(temp_dir.path()).await.unwrap_err();

        assert!(format!("{err:#}").contains("request-timeout-secs"));
    }
}
