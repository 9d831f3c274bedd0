mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use contracts_sdk::EXIT_FATAL;
use output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a default rule catalogue file.
const CATALOG_ENV: &str = "ODCS_RULE_CATALOG";

#[derive(Parser)]
#[command(name = "odcs")]
#[command(version, about = "ODCS v3.1.0 data contract validator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate contract files or directories of contracts
    Validate {
        /// Contract files (YAML, JSON or TOML) or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Rule catalogue overrides (falls back to $ODCS_RULE_CATALOG)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Load file-based external references and resolve their fragments
        #[arg(long)]
        follow_external: bool,

        /// Number of contracts validated concurrently
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Classify and resolve one relationship endpoint against a contract
    Resolve {
        /// Path to the contract file
        contract: PathBuf,

        /// Endpoint string, e.g. `orders.customer_id` or `schema/orders_tbl/properties/id`
        endpoint: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Create a new contract scaffold
    Init {
        /// Output file path
        output: PathBuf,

        /// Data product name (derived from the file name by default)
        #[arg(short, long)]
        name: Option<String>,

        /// Business domain
        #[arg(short, long)]
        domain: Option<String>,

        /// Write the smallest valid contract
        #[arg(long)]
        minimal: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    if let Err(e) = run(cli.command).await {
        output::print_error(&format!("Error: {e:#}"));
        std::process::exit(EXIT_FATAL);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate {
            paths,
            format,
            catalog,
            follow_external,
            jobs,
        } => {
            let catalog = catalog.or_else(|| std::env::var_os(CATALOG_ENV).map(PathBuf::from));
            commands::validate::execute(&paths, format, catalog.as_deref(), follow_external, jobs)
                .await
        }

        Commands::Resolve {
            contract,
            endpoint,
            format,
        } => commands::resolve::execute(&contract, &endpoint, format).await,

        Commands::Init {
            output,
            name,
            domain,
            minimal,
            force,
        } => {
            commands::init::execute(&output, name.as_deref(), domain.as_deref(), minimal, force)
                .await
        }
    }
}
