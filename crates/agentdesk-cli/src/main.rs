//! AgentDesk - main entry point.
//!
//! Parses arguments, loads configuration, and runs one command on a
//! current-thread tokio runtime.

use agentdesk_cli::commands::{self, Session};
use agentdesk_cli::logging::init_tracing;
use agentdesk_cli::{Cli, CliError, Command};
use agentdesk_store::ViewStatus;
use clap::Parser;

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::load_config(cli.config.as_deref())?;
    let session = Session::resolve(&cli, &config)?;
    tracing::debug!("Using data from {}", session.source.root().display());

    match &cli.command {
        Command::List(args) => {
            let table = commands::list(&session, args).await?;
            print!("{}", table);
        }
        Command::Export { view, out_dir } => {
            let path = commands::export(&session, view, out_dir.as_deref()).await?;
            println!("{}", path.display());
        }
        Command::AddBooking(args) => {
            let (created, view) = commands::add_booking(&session, args).await?;
            let id = created.id().map(|id| id.0).unwrap_or_default();
            println!("Booking {} added", id);
            if view.status != ViewStatus::Ready {
                tracing::warn!("Refetch after create did not succeed: {:?}", view.status);
            } else {
                tracing::info!("{} bookings on record", view.len());
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::debug!("AgentDesk starting...");

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            let e = CliError::Runtime(e.to_string());
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli)) {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
