//! Hierarchical record synthesis: one master row per catalog entity, one
//! child row per provider interval actually found, in provider-priority
//! then discovery order.
//!
//! Single pass, write-as-you-go. Per-record data-quality issues (an
//! external id absent from its provider's index, a feature type with no
//! standard-term translation) are counted and logged but never abort the
//! run; a missing provider must not suppress the master record or the
//! remaining providers' children.

use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;
use tracing::warn;

use crate::catalog::{Catalog, Entity, ProviderAssociation};
use crate::gff::{attributes::Attributes, GffWriter, OutputRecord, RecordKind};
use crate::providers::{registry, IndexStats, ProviderIndices, ProviderSpec};

/// Column-2 label and Dbxref namespace for entities no provider knows
pub const INTERNAL_SOURCE: &str = "MGI";

/// Structured counts accumulated over one synthesis run
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub entities: u64,
    pub masters: u64,
    pub children: u64,
    /// Entities with no provider association at all
    pub self_fallbacks: u64,
    /// Feature types without a standard-term translation
    pub untranslated_types: u64,
    /// Expected external ids absent from a provider's index, per provider
    pub index_misses: IndexMap<String, u64>,
    /// Line accounting from the indexing stage, per provider
    pub provider_files: IndexMap<String, IndexStats>,
}

impl RunSummary {
    pub fn total_index_misses(&self) -> u64 {
        self.index_misses.values().sum()
    }

    pub fn total_skipped_lines(&self) -> u64 {
        self.provider_files.values().map(|s| s.skipped).sum()
    }
}

pub struct Synthesizer<'a> {
    catalog: &'a Catalog,
    indices: &'a ProviderIndices,
    next_master: u64,
    summary: RunSummary,
}

impl<'a> Synthesizer<'a> {
    pub fn new(catalog: &'a Catalog, indices: &'a ProviderIndices) -> Self {
        Self {
            catalog,
            indices,
            next_master: 0,
            summary: RunSummary::default(),
        }
    }

    /// Stream every record for every entity into the writer as it is
    /// produced. Not restartable; a partially written file from an
    /// aborted run must be regenerated from scratch.
    pub fn run<W: Write>(&mut self, writer: &mut GffWriter<W>) -> crate::Result<()> {
        let entities = self.catalog.entities();
        for entity in entities {
            for record in self.records_for(entity) {
                writer.write_record(&record)?;
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    /// Master plus children for one entity, in output order
    pub fn records_for(&mut self, entity: &Entity) -> Vec<OutputRecord> {
        let catalog = self.catalog;
        let indices = self.indices;

        self.summary.entities += 1;
        self.next_master += 1;
        let master_id = format!("reg{:06}", self.next_master);

        // Associated providers in registry (priority) order; the first one
        // is the entity's primary provider.
        let associated: Vec<(&'static ProviderSpec, &ProviderAssociation)> = registry()
            .iter()
            .filter_map(|spec| {
                catalog
                    .associations_for(&entity.accession)
                    .iter()
                    .find(|a| a.provider == spec.kind)
                    .map(|a| (spec, a))
            })
            .collect();

        let so_term = catalog.so_term(&entity.feature_type);
        if so_term.is_none() {
            self.summary.untranslated_types += 1;
        }
        let so_name = so_term.map(|t| t.name.clone()).unwrap_or_default();

        let mut records = Vec::with_capacity(1 + associated.len());
        records.push(self.master_record(entity, &master_id, &associated, &so_name));

        if associated.is_empty() {
            // Self-fallback: the entity's own coordinates become its only
            // child, and no providers are consulted.
            self.summary.self_fallbacks += 1;
            records.push(self.fallback_child(entity, &master_id, &so_name));
            return records;
        }

        let mut sequence = 0u64;
        for (spec, association) in &associated {
            let intervals = indices
                .get(spec.kind)
                .and_then(|index| index.get(&association.external_id));
            let Some(intervals) = intervals else {
                warn!(
                    provider = spec.label,
                    external_id = %association.external_id,
                    accession = %entity.accession,
                    "external id absent from provider index"
                );
                *self
                    .summary
                    .index_misses
                    .entry(spec.label.to_string())
                    .or_default() += 1;
                continue;
            };
            for interval in intervals {
                sequence += 1;
                let mut attributes = Attributes::new();
                attributes.push("ID", &format!("{}.{}", master_id, sequence));
                attributes.push("Name", &entity.symbol);
                attributes.push("description", &entity.description);
                attributes.push_multi("Dbxref", interval.dbxref.clone());
                attributes.push("Parent", &master_id);

                self.summary.children += 1;
                records.push(OutputRecord {
                    kind: RecordKind::Child,
                    chromosome: entity.chromosome.clone(),
                    source: spec.label.to_string(),
                    feature_term: interval.feature_type.clone(),
                    start: interval.start,
                    end: interval.end,
                    strand: interval.strand,
                    attributes,
                });
            }
        }

        records
    }

    fn master_record(
        &mut self,
        entity: &Entity,
        master_id: &str,
        associated: &[(&'static ProviderSpec, &ProviderAssociation)],
        so_name: &str,
    ) -> OutputRecord {
        let dbxref: Vec<String> = associated
            .iter()
            .map(|(spec, a)| format!("{}:{}", spec.label, a.external_id))
            .collect();
        let primary_label = associated
            .first()
            .map(|(spec, _)| spec.label)
            .unwrap_or(INTERNAL_SOURCE);

        let mut attributes = Attributes::new();
        attributes.push("ID", master_id);
        attributes.push("Name", &entity.symbol);
        attributes.push("description", &entity.description);
        attributes.push("curie", &entity.accession);
        attributes.push_multi("Dbxref", dbxref);
        attributes.push("mgi_type", &entity.feature_type);
        attributes.push("so_term_name", so_name);
        if !entity.synonyms.is_empty() {
            attributes.push_multi(
                "Synonym",
                entity.synonyms.iter().map(|s| s.render()).collect(),
            );
        }

        self.summary.masters += 1;
        OutputRecord {
            kind: RecordKind::Master,
            chromosome: entity.chromosome.clone(),
            source: primary_label.to_string(),
            feature_term: so_name.to_string(),
            start: entity.start,
            end: entity.end,
            strand: entity.strand,
            attributes,
        }
    }

    fn fallback_child(&mut self, entity: &Entity, master_id: &str, so_name: &str) -> OutputRecord {
        let mut attributes = Attributes::new();
        attributes.push("ID", &format!("{}.1", master_id));
        attributes.push("Name", &entity.symbol);
        attributes.push("description", &entity.description);
        attributes.push("Dbxref", &entity.accession);
        attributes.push("Parent", master_id);

        self.summary.children += 1;
        OutputRecord {
            kind: RecordKind::Child,
            chromosome: entity.chromosome.clone(),
            source: INTERNAL_SOURCE.to_string(),
            feature_term: so_name.to_string(),
            start: entity.start,
            end: entity.end,
            strand: entity.strand,
            attributes,
        }
    }
}
