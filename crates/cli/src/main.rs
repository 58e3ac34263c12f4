//! Golden Fig CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run commerce (shop schema) migrations
//! gf-cli migrate commerce
//!
//! # Run storefront / studio migrations
//! gf-cli migrate storefront
//! gf-cli migrate studio
//!
//! # Run everything
//! gf-cli migrate all
//!
//! # Seed the catalog with sample data
//! gf-cli seed
//!
//! # Create a staff account (prints a generated password)
//! gf-cli staff create -e ops@goldenfig.shop -n "Ops"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gf-cli")]
#[command(author, version, about = "Golden Fig CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Seed the catalog with sample data
    Seed,
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run commerce (shop schema) migrations
    Commerce,
    /// Run storefront migrations
    Storefront,
    /// Run studio migrations
    Studio,
    /// Run all migrations
    All,
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new staff account
    Create {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// Staff display name
        #[arg(short, long)]
        name: String,
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Commerce => commands::migrate::commerce().await?,
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Studio => commands::migrate::studio().await?,
            MigrateTarget::All => {
                commands::migrate::commerce().await?;
                commands::migrate::storefront().await?;
                commands::migrate::studio().await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
        Commands::Staff { action } => match action {
            StaffAction::Create { email, name } => {
                commands::staff::create(&email, &name).await?;
            }
        },
    }
    Ok(())
}
