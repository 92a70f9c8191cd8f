//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rt_core::ReportKind;

/// RescueTime analytics reports from the terminal.
///
/// Builds a report query, fetches it from the analytics API and prints it as
/// JSON records or CSV.
#[derive(Debug, Parser)]
#[command(name = "rt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API key, overriding the configured one.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch and print a report.
    Report(ReportArgs),

    /// Check whether the API key is accepted.
    Check,

    /// List the productivity levels used in reports.
    Levels,
}

/// Report query options.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Report kind.
    #[arg(value_enum)]
    pub kind: ReportKindArg,

    /// Order by time, rank or member.
    #[arg(long)]
    pub order: Option<String>,

    /// Time bucket for chronological reports (minute, hour, day, week, month).
    #[arg(long, requires = "order")]
    pub interval: Option<String>,

    /// Restrict to a single day.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<String>,

    /// First day of the range.
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the range.
    #[arg(long)]
    pub to: Option<String>,

    /// Restrict to one activity or category.
    #[arg(long = "where", value_name = "NAME")]
    pub thing: Option<String>,

    /// Restrict to one document within the activity.
    #[arg(long, requires = "thing")]
    pub document: Option<String>,

    /// Output format (array, csv).
    #[arg(long, default_value = "array")]
    pub format: String,
}

/// Report kinds accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKindArg {
    Overview,
    Categories,
    Activities,
    Productivity,
    Efficiency,
}

impl From<ReportKindArg> for ReportKind {
    fn from(kind: ReportKindArg) -> Self {
        match kind {
            ReportKindArg::Overview => Self::Overview,
            ReportKindArg::Categories => Self::Category,
            ReportKindArg::Activities => Self::Activity,
            ReportKindArg::Productivity => Self::Productivity,
            ReportKindArg::Efficiency => Self::Efficiency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_report_command() {
        let cli = Cli::try_parse_from([
            "rt",
            "report",
            "activities",
            "--where",
            "github.com",
            "--document",
            "README.md",
            "--order",
            "time",
            "--interval",
            "hour",
            "--from",
            "2015-05-01",
            "--to",
            "2015-05-07",
            "--format",
            "csv",
        ])
        .unwrap();

        let Some(Commands::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.kind, ReportKindArg::Activities);
        assert_eq!(args.thing.as_deref(), Some("github.com"));
        assert_eq!(args.document.as_deref(), Some("README.md"));
        assert_eq!(args.interval.as_deref(), Some("hour"));
        assert_eq!(args.format, "csv");
    }

    #[test]
    fn format_defaults_to_array() {
        let cli = Cli::try_parse_from(["rt", "report", "overview"]).unwrap();
        let Some(Commands::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.format, "array");
    }

    #[test]
    fn document_requires_where() {
        assert!(Cli::try_parse_from(["rt", "report", "activities", "--document", "x"]).is_err());
    }

    #[test]
    fn date_conflicts_with_range() {
        assert!(
            Cli::try_parse_from([
                "rt", "report", "overview", "--date", "2015-05-01", "--from", "2015-05-01"
            ])
            .is_err()
        );
    }

    #[test]
    fn kinds_map_to_wire_kinds() {
        assert_eq!(ReportKind::from(ReportKindArg::Categories), ReportKind::Category);
        assert_eq!(ReportKind::from(ReportKindArg::Activities), ReportKind::Activity);
    }
}
