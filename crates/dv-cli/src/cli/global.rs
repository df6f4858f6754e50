use clap::ValueEnum;

/// How command responses are printed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON.
    Json,
    /// Aligned columns; lists print one row per entity or edit.
    Table,
    /// Single-line JSON, for piping into the issue workflow.
    Raw,
}

/// Global flags the command handlers read. Log verbosity is consumed by
/// tracing setup and not carried here.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub limit: Option<u32>,
    pub project: Option<String>,
}
