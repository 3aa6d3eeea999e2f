//! Shared end-to-end harness for integration tests: writes a catalog dump
//! to disk, indexes in-memory provider files, runs a full synthesis pass,
//! and returns the produced file as a string.

use chrono::Local;
use regatta::catalog::{CatalogSource, FeatureTypeFilter, JsonCatalog};
use regatta::gff::{GffWriter, Provenance, ProviderProvenance};
use regatta::providers::{index_provider, ProviderIndices, ProviderKind};
use regatta::synthesis::{RunSummary, Synthesizer};
use std::io::Cursor;

pub fn run_pipeline(
    catalog_json: &str,
    provider_files: &[(ProviderKind, &str)],
    feature_types: &[&str],
) -> (String, RunSummary) {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(&catalog_path, catalog_json).expect("write catalog dump");

    let filter = FeatureTypeFilter::new(feature_types.iter().copied());
    let catalog = JsonCatalog::new(&catalog_path)
        .load(&filter)
        .expect("load catalog");

    let mut indices = ProviderIndices::default();
    for (kind, contents) in provider_files {
        let (index, _stats) =
            index_provider(Cursor::new(contents.to_string()), kind.spec()).expect("index provider");
        indices.insert(*kind, index);
    }

    let mut writer = GffWriter::new(Vec::new());
    writer.write_header(&test_provenance()).expect("header");
    let mut synthesizer = Synthesizer::new(&catalog, &indices);
    synthesizer.run(&mut writer).expect("synthesis");
    let summary = synthesizer.into_summary();

    (
        String::from_utf8(writer.into_inner()).expect("utf8 output"),
        summary,
    )
}

fn test_provenance() -> Provenance {
    Provenance {
        file_name: "regulatory.gff3".to_string(),
        generated: Local::now(),
        taxon_id: 10090,
        genome_build: "GRCm39".to_string(),
        providers: vec![ProviderProvenance {
            heading: "ensembl regulatory build".to_string(),
            file: "regulatory_features.gff".to_string(),
            url: "https://ftp.ensembl.org/pub/current_regulation/mus_musculus/".to_string(),
            timestamp: "2025-02-01 12:00:00".to_string(),
        }],
    }
}

/// Non-comment lines of a produced file
pub fn data_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

/// Split one data line into its nine columns
pub fn columns(line: &str) -> Vec<&str> {
    line.split('\t').collect()
}

/// Value of one key in the attribute column of a data line
pub fn attr<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let col9 = columns(line)[8];
    col9.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}
