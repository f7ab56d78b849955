mod cli;
mod commands;
mod output;

use std::error::Error;
use std::io;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands, IssueCommands};
use taskboard::config::Config;
use taskboard::error::Result;
use taskboard::{logging, HttpTrackerClient, Tracker, TrackerApi};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            eprintln!("Kind: {}", e.kind());
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require config/client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "taskboard", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        // Commands that require config and client
        command => {
            let config = Config::load()?;
            logging::init(cli.verbose, &config);

            let api: Arc<dyn TrackerApi> =
                Arc::new(HttpTrackerClient::new(config.api_url()?, config.request_timeout())?);
            let mut tracker = Tracker::new(api.clone());

            match command {
                Commands::Boards => {
                    commands::boards::list(&tracker).await?;
                }
                Commands::Board { id } => {
                    commands::boards::show(&tracker, id).await?;
                }
                Commands::Issues(args) => {
                    commands::issues::list(&tracker, args).await?;
                }
                Commands::Users => {
                    commands::users::list(api.as_ref()).await?;
                }
                Commands::Issue { action } => match action {
                    IssueCommands::List(args) => {
                        commands::issues::list(&tracker, args).await?;
                    }
                    IssueCommands::View { id } => {
                        commands::issues::view(&tracker, id).await?;
                    }
                    IssueCommands::Create(args) => {
                        commands::issues::create(&mut tracker, args).await?;
                    }
                    IssueCommands::Update(args) => {
                        commands::issues::update(&mut tracker, args).await?;
                    }
                    IssueCommands::Move { id, to } => {
                        commands::issues::move_to(&tracker, id, to).await?;
                    }
                },
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
