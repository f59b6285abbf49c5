//! Artifi CLI - Database migrations and pricing tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! artifi-cli migrate
//!
//! # Print an order summary for a saved cart
//! artifi-cli quote cart.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `quote` - Price a cart snapshot with the configured rates

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "artifi-cli")]
#[command(author, version, about = "Artifi CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Print an order summary for a cart snapshot file
    Quote {
        /// Path to a JSON cart snapshot
        file: PathBuf,

        /// Print the totals as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Quote { file, json } => commands::quote::run(&file, json).await?,
    }
    Ok(())
}
