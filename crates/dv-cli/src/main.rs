use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod issue;
mod output;
mod write_lock;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        if let Some(rejected) = error.downcast_ref::<commands::Rejected>() {
            eprintln!("dataview: {rejected}");
            std::process::exit(2);
        }
        eprintln!("dataview error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();

    if let cli::Commands::Schema(args) = &cli.command {
        return commands::schema::handle(args, &flags);
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let project_root = context::resolve_project_root(flags.project.as_deref(), &cwd)?;
    let config = dv_config::DataViewConfig::load_with_dotenv(&project_root)
        .context("failed to load dataview configuration")?;

    let command = cli.command;
    let write_lock = if command_requires_write_lock(&command) {
        Some(write_lock::acquire_for_project(&project_root).await?)
    } else {
        None
    };

    let ctx = context::AppContext::init(&project_root, config)
        .await
        .context("failed to initialize dataview application context")?;

    let result = commands::dispatch::dispatch(command, &ctx, &flags).await;
    drop(write_lock);
    result
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("DATAVIEW_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

const fn command_requires_write_lock(command: &cli::Commands) -> bool {
    match command {
        cli::Commands::Submit(_) => true,
        cli::Commands::Apply(args) => !args.dry_run,
        cli::Commands::Validate(_)
        | cli::Commands::Log(_)
        | cli::Commands::Status
        | cli::Commands::List(_)
        | cli::Commands::Links(_)
        | cli::Commands::Schema(_) => false,
    }
}
