pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "regatta",
    version,
    about = "Multi-provider regulatory region reconciliation into a single hierarchical GFF3",
    long_about = "Regatta merges regulatory feature annotations from Ensembl, NCBI, and VISTA \
                  with a curated marker catalog, emitting one deduplicated, hierarchy-respecting \
                  annotation file per genome build for downstream browsers and pipelines."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the merged regulatory annotation file
    Generate(commands::generate::GenerateArgs),

    /// Parse one provider file and report indexing statistics
    Inspect(commands::inspect::InspectArgs),
}
