//! Parses one provider's annotation file into an ordered coordinate index.
//!
//! Comment lines are skipped. A line that matches the provider's record
//! selector but cannot yield a non-empty identifier and a sane coordinate
//! pair is skipped with a diagnostic and counted; provider files are
//! allowed a bounded rate of such noise. Only an unreadable file is fatal.

use flate2::read::GzDecoder;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

use super::{Cardinality, IdRule, LineSelector, ProviderSpec};
use crate::catalog::Strand;
use crate::gff::attributes::Attributes;

/// One coordinate record reported by a provider for an external id.
/// Discovery order within the source file is preserved by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderInterval {
    /// Feature type as reported in column 3
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    /// Raw cross-reference payload, embedded verbatim into child records
    pub dbxref: Vec<String>,
}

pub type ProviderIndex = IndexMap<String, Vec<ProviderInterval>>;

/// Line-level accounting for one indexed file
#[derive(Debug, Default, Clone, Serialize)]
pub struct IndexStats {
    /// Non-comment lines seen
    pub lines: u64,
    /// Lines matching the provider's record selector
    pub selected: u64,
    /// Intervals kept
    pub indexed: u64,
    /// Selected lines dropped for a missing id or bad coordinates
    pub skipped: u64,
}

/// Open a provider file, decompressing transparently when gzipped
pub fn open_provider_file(path: &Path) -> crate::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Index every record line of `reader` under this provider's rules
pub fn index_provider<R: BufRead>(
    reader: R,
    spec: &ProviderSpec,
) -> crate::Result<(ProviderIndex, IndexStats)> {
    let mut index = ProviderIndex::default();
    let mut stats = IndexStats::default();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        stats.lines += 1;

        let fields: Vec<&str> = line.split('\t').collect();
        if !is_selected(&fields, spec.selector) {
            continue;
        }
        stats.selected += 1;

        match extract(&fields, spec) {
            Ok((id, interval)) => {
                let intervals = index.entry(id).or_default();
                if spec.cardinality == Cardinality::One && !intervals.is_empty() {
                    debug!(
                        provider = spec.label,
                        line = number + 1,
                        "additional interval for a single-record provider"
                    );
                }
                intervals.push(interval);
                stats.indexed += 1;
            }
            Err(reason) => {
                warn!(
                    provider = spec.label,
                    line = number + 1,
                    %reason,
                    "skipping malformed record line"
                );
                stats.skipped += 1;
            }
        }
    }

    Ok((index, stats))
}

fn is_selected(fields: &[&str], selector: LineSelector) -> bool {
    match selector {
        LineSelector::Any => true,
        LineSelector::Dbxref { prefix } => attribute_column(fields)
            .map(|col| col.contains("Dbxref=") && col.contains(prefix))
            .unwrap_or(false),
        LineSelector::SourceAndDbxref { source, prefix } => {
            fields.get(1) == Some(&source)
                && attribute_column(fields)
                    .map(|col| col.contains("Dbxref=") && col.contains(prefix))
                    .unwrap_or(false)
        }
    }
}

fn attribute_column<'a>(fields: &[&'a str]) -> Option<&'a str> {
    fields.get(8).copied()
}

fn extract(fields: &[&str], spec: &ProviderSpec) -> Result<(String, ProviderInterval), String> {
    let col9 = attribute_column(fields).ok_or("missing attribute column")?;
    let attrs =
        Attributes::decode(col9).map_err(|e| format!("unparseable attribute block: {}", e))?;

    let id = external_id(&attrs, spec.id_rule).ok_or("missing external identifier")?;

    let start = coordinate(fields, spec.coords.start)?;
    let end = coordinate(fields, spec.coords.end)?;
    if start > end {
        return Err(format!("start {} > end {}", start, end));
    }

    let feature_type = fields
        .get(2)
        .filter(|t| !t.is_empty())
        .ok_or("missing feature type")?
        .to_string();
    let strand = fields.get(6).map(|s| Strand::parse(s)).unwrap_or_default();

    // The Dbxref payload travels into child records untouched; providers
    // without one are represented by their own ID attribute.
    let dbxref = match attrs.values("Dbxref") {
        Some(values) => values.to_vec(),
        None => attrs
            .get("ID")
            .map(|v| vec![v.to_string()])
            .unwrap_or_default(),
    };

    Ok((
        id,
        ProviderInterval {
            feature_type,
            start,
            end,
            strand,
            dbxref,
        },
    ))
}

fn external_id(attrs: &Attributes, rule: IdRule) -> Option<String> {
    let id = match rule {
        IdRule::IdAttributeLastColon => attrs
            .get("ID")
            .map(|v| v.rsplit(':').next().unwrap_or(v))?
            .to_string(),
        IdRule::DbxrefPrefix(prefix) => attrs
            .values("Dbxref")?
            .iter()
            .find_map(|v| v.strip_prefix(prefix))?
            .to_string(),
    };
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn coordinate(fields: &[&str], column: usize) -> Result<u64, String> {
    let raw = fields
        .get(column - 1)
        .ok_or_else(|| format!("missing column {}", column))?;
    raw.parse::<u64>()
        .map_err(|_| format!("bad coordinate '{}' in column {}", raw, column))
}
