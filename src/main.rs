use clap::Parser;
use colored::*;
use regatta::cli::{Cli, Commands};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // REGATTA_LOG wins over the --verbose flag when both are set
    let log_level = std::env::var("REGATTA_LOG").unwrap_or_else(|_| {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<regatta::RegattaError>() {
            Some(regatta::RegattaError::Config(_)) => 2,
            Some(regatta::RegattaError::Io(_)) => 3,
            Some(regatta::RegattaError::Parse(_)) => 4,
            Some(regatta::RegattaError::Catalog(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => regatta::cli::commands::generate::run(args),
        Commands::Inspect(args) => regatta::cli::commands::inspect::run(args),
    }
}
