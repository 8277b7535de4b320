use anyhow::Result;
use clap::Parser;

use storycards::cli::handlers::{CommandContext, ListParams, PrintParams, handle_list, handle_print};
use storycards::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    storycards::logging::init(cli.verbose, cli.log_file.clone());

    let ctx = CommandContext::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Print {
            tracker,
            output_dir,
            assets_dir,
            no_open,
            yes,
        } => handle_print(
            &ctx,
            PrintParams {
                tracker,
                output_dir,
                assets_dir,
                no_open,
                yes,
            },
        ),
        Commands::List { tracker, json } => handle_list(&ctx, ListParams { tracker, json }),
    }
}
