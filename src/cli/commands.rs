use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::errors::VulnrecError;
use crate::models::{FindingFilter, ScoreRange, SCORE_MAX, SCORE_MIN};

#[derive(Parser)]
#[command(name = "vulnrec", version, about = "Submit vulnerability findings and review remediation recommendations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis service base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a findings document and wait for recommendations
    Upload(UploadArgs),
    /// Show a bundled example result set
    Example(ExampleArgs),
    /// Resume polling a previously submitted job
    Watch(WatchArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct SeverityArgs {
    /// Lowest severity to show (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub severity_min: Option<u8>,

    /// Highest severity to show (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub severity_max: Option<u8>,
}

impl SeverityArgs {
    /// The requested range; `None` when it would filter nothing.
    pub fn range(&self) -> Result<Option<ScoreRange>, VulnrecError> {
        let range = ScoreRange::new(
            self.severity_min.unwrap_or(SCORE_MIN),
            self.severity_max.unwrap_or(SCORE_MAX),
        )?;
        Ok((!range.is_full()).then_some(range))
    }
}

#[derive(Args, Clone, Debug)]
pub struct UploadArgs {
    /// Findings document (JSON)
    pub file: PathBuf,

    #[command(flatten)]
    pub severity: SeverityArgs,

    /// Lowest priority to submit (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub priority_min: Option<u8>,

    /// Highest priority to submit (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub priority_max: Option<u8>,

    /// Only submit findings reported by this scanner (repeatable)
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// Only submit findings with this CVE id (repeatable)
    #[arg(long = "cve")]
    pub cve_ids: Vec<String>,

    /// Only submit findings with this CWE id (repeatable)
    #[arg(long = "cwe")]
    pub cwe_ids: Vec<String>,

    /// Replace an existing job for the same input
    #[arg(long)]
    pub force: bool,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

impl UploadArgs {
    /// Submission filter built from the flags.
    pub fn filter(&self) -> Result<FindingFilter, VulnrecError> {
        let mut filter = FindingFilter {
            source: self.sources.clone(),
            cve_ids: self.cve_ids.clone(),
            cwe_ids: self.cwe_ids.clone(),
            ..Default::default()
        };
        if let Some(range) = self.severity.range()? {
            filter = filter.with_severity(range);
        }
        let priority = ScoreRange::new(
            self.priority_min.unwrap_or(SCORE_MIN),
            self.priority_max.unwrap_or(SCORE_MAX),
        )?;
        Ok(filter.with_priority(priority))
    }
}

#[derive(Args, Clone, Debug)]
pub struct ExampleArgs {
    /// Example name: llama3, claude-opus, gpt4o
    #[arg(default_value = crate::gateway::DEFAULT_EXAMPLE)]
    pub name: String,

    #[command(flatten)]
    pub severity: SeverityArgs,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    /// Job id returned by an earlier upload
    pub job_id: String,

    #[command(flatten)]
    pub severity: SeverityArgs,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Configuration file to check
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_flags_build_filter() {
        let cli = Cli::parse_from([
            "vulnrec", "upload", "report.json",
            "--severity-min", "40",
            "--source", "Trivy", "--source", "Grype",
            "--cve", "CVE-2023-4132",
            "--priority-min", "0", "--priority-max", "100",
        ]);
        let Commands::Upload(args) = cli.command else { panic!("expected upload") };
        let filter = args.filter().unwrap();
        assert_eq!(filter.severity, Some(ScoreRange::new(40, 100).unwrap()));
        assert_eq!(filter.priority, None);
        assert_eq!(filter.source, vec!["Trivy", "Grype"]);
        assert_eq!(filter.cve_ids, vec!["CVE-2023-4132"]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let args = SeverityArgs { severity_min: Some(70), severity_max: Some(10) };
        assert!(matches!(args.range(), Err(VulnrecError::InvalidFilter(_))));
    }

    #[test]
    fn test_out_of_range_flag_rejected_by_parser() {
        assert!(Cli::try_parse_from(["vulnrec", "example", "--severity-max", "101"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["vulnrec", "watch", "42", "-vv", "--api-url", "http://analysis:8000"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_url.as_deref(), Some("http://analysis:8000"));
        assert!(matches!(cli.command, Commands::Watch(ref w) if w.job_id == "42"));
    }
}
