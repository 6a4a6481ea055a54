//! PopGames CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! popgames-cli migrate
//!
//! # Seed a development shop (session token + store row)
//! popgames-cli seed -s dev-shop.myshopify.com -t shpat_xxx
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed a development shop

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "popgames-cli")]
#[command(author, version, about = "PopGames CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed a development shop
    Seed {
        /// Shop domain (e.g. dev-shop.myshopify.com)
        #[arg(short, long)]
        shop: String,

        /// Offline Admin API access token for the shop
        #[arg(short, long)]
        token: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { shop, token } => commands::seed::dev_shop(&shop, &token).await?,
    }
    Ok(())
}
