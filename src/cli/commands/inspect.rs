use anyhow::Context;
use clap::Args;
use colored::*;
use serde_json::json;
use std::path::PathBuf;

use crate::providers::{index_provider, open_provider_file, ProviderKind};

#[derive(Args)]
pub struct InspectArgs {
    /// Provider file to parse
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Which provider's parsing rules to apply (ncbi, ensembl, vista)
    #[arg(short, long)]
    pub provider: ProviderKind,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Show the first N indexed identifiers
    #[arg(long, default_value = "10")]
    pub head: usize,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let spec = args.provider.spec();
    let reader = open_provider_file(&args.input)
        .with_context(|| format!("cannot open provider file {}", args.input.display()))?;
    let (index, stats) = index_provider(reader, spec)?;

    if args.format == "json" {
        let intervals: u64 = index.values().map(|v| v.len() as u64).sum();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "provider": spec.label,
                "file": args.input.display().to_string(),
                "external_ids": index.len(),
                "intervals": intervals,
                "stats": stats,
            }))?
        );
        return Ok(());
    }

    println!("{}", format!("{}: {}", spec.label, args.input.display()).bold());
    println!(
        "  {} lines, {} selected, {} indexed, {} skipped",
        stats.lines, stats.selected, stats.indexed, stats.skipped
    );
    println!("  {} distinct external ids", index.len());
    for (id, intervals) in index.iter().take(args.head) {
        println!("  {} -> {} interval(s)", id, intervals.len());
    }
    if index.len() > args.head {
        println!("  ... and {} more", index.len() - args.head);
    }

    Ok(())
}
