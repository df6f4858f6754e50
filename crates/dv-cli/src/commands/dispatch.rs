use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Validate(args) => commands::validate::handle(&args, ctx, flags).await,
        Commands::Submit(args) => commands::submit::handle(&args, ctx, flags).await,
        Commands::Apply(args) => commands::apply::handle(&args, ctx, flags).await,
        Commands::Log(args) => commands::log::handle(&args, ctx, flags),
        Commands::Status => commands::status::handle(ctx, flags).await,
        Commands::List(args) => commands::list::handle(&args, ctx, flags).await,
        Commands::Links(args) => commands::links::handle(&args, ctx, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
