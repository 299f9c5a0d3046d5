// ectd_cli/src/main.rs
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ectd_cli::commands;
use ectd_service::config::Config;

#[derive(Parser)]
#[command(name = "ectd_forge")]
#[command(about = "eCTD submission sequence builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the database schema from embedded assets
    Rebuild(commands::rebuild::RebuildArgs),

    /// Print the most recent sequence number
    LastSequence,

    /// Build the next sequence from a plan file
    Build(commands::build::BuildArgs),

    /// Check a plan file before building
    Validate(commands::validate::ValidateArgs),

    /// Run the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // 1. Load Config (Fails fast if invalid)
    let config = Config::from_env()?;

    // 2. Parse arguments and route to the correct command
    let cli = Cli::parse();

    match cli.command {
        Commands::Rebuild(args) => {
            let pool = commands::connect(&config).await?;
            commands::rebuild::execute(pool, args).await?;
        }
        Commands::LastSequence => {
            let service = commands::pg_service(&config).await?;
            commands::last_sequence::execute(&service).await?;
        }
        Commands::Build(args) => {
            let service = commands::pg_service(&config).await?;
            commands::build::execute(&service, &config, args).await?;
        }
        Commands::Validate(args) => {
            // Without a database only the plan's own shape can be checked
            let service = match config.database_url {
                Some(_) => Some(commands::pg_service(&config).await?),
                None => None,
            };
            commands::validate::execute(service.as_ref(), args).await?;
        }
        Commands::Serve => {
            ectd_api::run(config).await?;
        }
    }

    Ok(())
}
