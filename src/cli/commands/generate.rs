use anyhow::Context;
use chrono::{DateTime, Local};
use clap::Args;
use colored::*;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

use crate::catalog::{CatalogSource, FeatureTypeFilter, JsonCatalog};
use crate::config::{self, Config, ProviderFileConfig};
use crate::gff::{GffWriter, Provenance, ProviderProvenance};
use crate::providers::{index_provider, open_provider_file, ProviderIndices, ProviderKind};
use crate::report;
use crate::synthesis::Synthesizer;
use crate::RegattaError;

#[derive(Args)]
pub struct GenerateArgs {
    /// Run configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "REGATTA_CONFIG",
        default_value = "regatta.toml"
    )]
    pub config: PathBuf,

    /// Output annotation file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Write a JSON run summary to this path
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Override the configured NCBI provider file
    #[arg(long, value_name = "FILE")]
    pub ncbi: Option<PathBuf>,

    /// Override the configured Ensembl provider file
    #[arg(long, value_name = "FILE")]
    pub ensembl: Option<PathBuf>,

    /// Override the configured VISTA provider file
    #[arg(long, value_name = "FILE")]
    pub vista: Option<PathBuf>,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let mut config = config::load_config(&args.config)?;
    apply_override(&mut config, ProviderKind::Ncbi, args.ncbi.as_ref());
    apply_override(&mut config, ProviderKind::Ensembl, args.ensembl.as_ref());
    apply_override(&mut config, ProviderKind::Vista, args.vista.as_ref());

    let filter = FeatureTypeFilter::new(config.catalog.feature_types.iter().cloned());
    let catalog = JsonCatalog::new(&config.catalog.path).load(&filter)?;
    info!(entities = catalog.len(), "catalog loaded");

    let mut indices = ProviderIndices::default();
    let mut file_stats = IndexMap::new();
    let mut stanzas = Vec::with_capacity(config.providers.len());

    for provider in &config.providers {
        let spec = provider.kind.spec();
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Indexing {}...", provider.file.display()));

        let reader = open_provider_file(&provider.file)
            .with_context(|| format!("cannot open provider file {}", provider.file.display()))?;
        let (index, stats) = index_provider(reader, spec)?;
        pb.finish_with_message(format!(
            "Indexed {} external ids from {} ({} skipped)",
            index.len(),
            provider.file.display(),
            stats.skipped
        ));

        indices.insert(provider.kind, index);
        file_stats.insert(spec.label.to_string(), stats);
        stanzas.push(provenance_stanza(provider));
    }

    let provenance = Provenance {
        file_name: args
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "regulatory.gff3".to_string()),
        generated: Local::now(),
        taxon_id: config.assembly.taxon_id,
        genome_build: config.assembly.genome_build.clone(),
        providers: stanzas,
    };

    let out = File::create(&args.output).map_err(|e| {
        RegattaError::Output(format!("cannot create {}: {}", args.output.display(), e))
    })?;
    let mut writer = GffWriter::new(BufWriter::new(out));
    writer.write_header(&provenance)?;

    let mut synthesizer = Synthesizer::new(&catalog, &indices);
    synthesizer.run(&mut writer)?;
    writer.flush()?;

    let mut summary = synthesizer.into_summary();
    summary.provider_files = file_stats;

    println!(
        "{}",
        format!(
            "Wrote {} records to {}",
            writer.records_written(),
            args.output.display()
        )
        .green()
    );
    print!("{}", report::summary_text(&summary));

    if let Some(path) = &args.summary {
        std::fs::write(path, report::summary_json(&summary)?)
            .with_context(|| format!("cannot write summary {}", path.display()))?;
    }

    Ok(())
}

fn apply_override(config: &mut Config, kind: ProviderKind, file: Option<&PathBuf>) {
    let Some(file) = file else { return };
    if let Some(provider) = config.providers.iter_mut().find(|p| p.kind == kind) {
        provider.file = file.clone();
    } else {
        config.providers.push(ProviderFileConfig {
            kind,
            file: file.clone(),
            url: None,
        });
    }
}

fn provenance_stanza(provider: &ProviderFileConfig) -> ProviderProvenance {
    let heading = match provider.kind {
        ProviderKind::Ncbi => "ncbi regulatory build",
        ProviderKind::Ensembl => "ensembl regulatory build",
        ProviderKind::Vista => "VISTA",
    };
    let file = provider
        .file
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| provider.file.display().to_string());
    let timestamp = std::fs::metadata(&provider.file)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    ProviderProvenance {
        heading: heading.to_string(),
        file,
        url: provider.url.clone().unwrap_or_default(),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_replaces_or_appends() {
        let mut config = Config::default();
        let replacement = PathBuf::from("/tmp/ncbi.gff");
        apply_override(&mut config, ProviderKind::Ncbi, Some(&replacement));
        assert_eq!(
            config.provider_file(ProviderKind::Ncbi).unwrap().file,
            replacement
        );

        config.providers.retain(|p| p.kind != ProviderKind::Vista);
        let added = PathBuf::from("/tmp/vista.gff");
        apply_override(&mut config, ProviderKind::Vista, Some(&added));
        let vista = config.provider_file(ProviderKind::Vista).unwrap();
        assert_eq!(vista.file, added);
        assert!(vista.url.is_none());
    }

    #[test]
    fn test_provenance_strips_compression_extension() {
        let provider = ProviderFileConfig {
            kind: ProviderKind::Ensembl,
            file: PathBuf::from("/data/regulatory_features.gff.gz"),
            url: Some("https://ftp.ensembl.org/".to_string()),
        };
        let stanza = provenance_stanza(&provider);
        assert_eq!(stanza.file, "regulatory_features.gff");
        assert_eq!(stanza.heading, "ensembl regulatory build");
        // the file does not exist, so the timestamp degrades gracefully
        assert_eq!(stanza.timestamp, "unknown");
    }
}
