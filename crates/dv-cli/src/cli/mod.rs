use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `dataview` binary.
#[derive(Debug, Parser)]
#[command(
    name = "dataview",
    version,
    about = "dataview - review corrections for the extracted event database"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .dataview)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["dataview", "--format", "table", "--verbose", "status"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["dataview", "apply", "--dry-run", "--format", "raw", "-q"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Apply(args) if args.dry_run));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["dataview", "--format", "xml", "status"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn list_page_defaults_to_first() {
        let cli = Cli::try_parse_from(["dataview", "list", "actor"]).expect("cli should parse");
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.table, "actor");
        assert_eq!(args.page, 1);
    }

    #[test]
    fn links_takes_table_and_id() {
        let cli = Cli::try_parse_from(["dataview", "links", "timestamp", "789"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Links(args) if args.table == "timestamp" && args.id == 789
        ));
    }

    #[test]
    fn log_filters_parse() {
        let cli = Cli::try_parse_from(["dataview", "log", "--table", "actor", "--id", "4"])
            .expect("cli should parse");
        let Commands::Log(args) = cli.command else {
            panic!("expected log");
        };
        assert!(!args.check);
        assert_eq!(args.table.as_deref(), Some("actor"));
        assert_eq!(args.id, Some(4));
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["dataview", "--project", "/tmp/demo", "status"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
    }
}
