use clap::{Args, Subcommand};

/// Top-level commands for the `dataview` binary.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Check a submission against the current database without logging it.
    Validate(SubmissionArgs),
    /// Validate a submission and append it to the edit log.
    Submit(SubmissionArgs),
    /// Replay the edit log onto the database.
    Apply(ApplyArgs),
    /// Show logged edits.
    Log(LogArgs),
    /// Per-table review status counts.
    Status,
    /// One page of a table's browse list.
    List(ListArgs),
    /// Review links and record navigation for one entity.
    Links(LinksArgs),
    /// Dump JSON schema for a registered type.
    Schema(SchemaArgs),
}

/// Arguments for `dataview validate` and `dataview submit`.
#[derive(Clone, Debug, Args)]
pub struct SubmissionArgs {
    /// File holding a JSON object or an issue body with a ```json block.
    /// Reads stdin when omitted or `-`.
    pub input: Option<String>,
    /// Reviewer to record when the submission leaves `reviewer` blank.
    #[arg(long)]
    pub reviewer: Option<String>,
}

/// Arguments for `dataview apply`.
#[derive(Clone, Debug, Args)]
pub struct ApplyArgs {
    /// Report what would change without writing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `dataview log`.
#[derive(Clone, Debug, Args)]
pub struct LogArgs {
    /// Validate every line against the log-line schema instead of listing.
    #[arg(long)]
    pub check: bool,
    /// Only edits against this table.
    #[arg(long)]
    pub table: Option<String>,
    /// Only edits against this id (usually with --table).
    #[arg(long)]
    pub id: Option<i64>,
}

/// Arguments for `dataview list`.
#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    pub table: String,
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// Arguments for `dataview links`.
#[derive(Clone, Debug, Args)]
pub struct LinksArgs {
    pub table: String,
    pub id: i64,
}

/// Arguments for `dataview schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Registered schema name; lists all names when omitted.
    pub type_name: Option<String>,
}
