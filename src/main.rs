//! obsync - vault to GitHub sync
//!
//! Synchronize a local document vault with a private GitHub repository.
//!
//! Available as the `obs` command.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use obsync::cli::commands::{Cli, Commands};
use obsync::cli::{auth, init, pull, push, update};
use obsync::error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init::handle_init(args).await,
        Commands::Push(args) => push::handle_push(args).await,
        Commands::Pull => pull::handle_pull().await,
        Commands::Update => update::handle_update().await,
        Commands::Auth(args) => auth::handle_auth(args.command).await,
    }
}
