//! kustodian - compiles GitOps templates into Flux CD resources

use anyhow::Result;
use clap::{Parser, Subcommand};
use kustodian::cli::{
    ConfigSubcommand, GenerateArgs, InputArgs, handle_config_command, handle_generate,
    handle_validate, init_logging,
};

/// kustodian - compiles GitOps templates into Flux CD resources
#[derive(Parser, Debug)]
#[command(name = "kustodian", version)]
#[command(about = "Compiles multi-layer GitOps templates into validated Flux CD resources", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Write logs to a temporary file instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Generate Flux resources for a cluster
    Generate(GenerateArgs),
    /// Validate a cluster against its templates
    Validate(InputArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = init_logging(args.debug, args.log_file)?;
    if let Some(ref log_path) = log_file {
        eprintln!("Logs written to: {}", log_path.display());
    }
    tracing::debug!("Starting kustodian {}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Generate(generate) => handle_generate(generate).await,
        Command::Validate(inputs) => handle_validate(inputs).await,
        Command::Config { subcommand } => handle_config_command(subcommand).await,
    }
}
