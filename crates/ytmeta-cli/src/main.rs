mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "ytmeta=info",
        1 => "ytmeta=debug",
        2 => "ytmeta=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    // Handle commands
    match cli.command {
        Some(Commands::Fetch { videos, options }) => {
            commands::fetch::run(&videos, &options, cli.config.as_deref()).await
        }
        Some(Commands::Batch {
            input,
            parallel,
            options,
        }) => commands::batch::run(&input, parallel, &options, cli.config.as_deref()).await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => {
            // Videos given directly are shorthand for `fetch <VIDEOS>...`
            if !cli.videos.is_empty() {
                let options = args::FetchOptions {
                    force: cli.force,
                    languages: Vec::new(),
                    mirror: None,
                    persist: false,
                    json: cli.json,
                };
                commands::fetch::run(&cli.videos, &options, cli.config.as_deref()).await
            } else {
                // No videos, print help
                use clap::CommandFactory;
                Cli::command().print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
