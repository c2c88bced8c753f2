//! CloudCraft CLI, the operator entry point.
//!
//! Commands:
//! - `onboard`  Write the default config file
//! - `serve`    Start the relay backend
//! - `setup`    Provision the agent and its dispatch function
//! - `dispatch` Run one action-group event locally
//! - `schema`   Print the action schema
//! - `doctor`   Check configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cloudcraft",
    about = "CloudCraft: natural-language AWS provisioning through a hosted agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Start the relay HTTP backend
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Provision roles, the dispatch function, the agent and its alias
    Setup,

    /// Run one action-group event through the dispatcher
    Dispatch {
        /// Path to a JSON event, or `-` for stdin
        #[arg(short, long)]
        event: String,
    },

    /// Print the action schema registered with the agent
    Schema,

    /// Check configuration and agent ids
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Setup => commands::setup::run().await?,
        Commands::Dispatch { event } => commands::dispatch::run(&event).await?,
        Commands::Schema => commands::schema::run()?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
