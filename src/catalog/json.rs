//! File-backed [`CatalogSource`]: a single JSON dump with `entities`,
//! `associations`, and `term_map` arrays, produced by the upstream
//! extraction step against the relational catalog.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{
    Associations, Catalog, CatalogSource, Entity, FeatureTypeFilter, ProviderAssociation, SoTerm,
    Strand, Synonym, TermMap,
};
use crate::providers::ProviderKind;
use crate::RegattaError;

#[derive(Debug, Deserialize)]
struct CatalogDump {
    entities: Vec<EntityRow>,
    #[serde(default)]
    associations: Vec<AssociationRow>,
    #[serde(default)]
    term_map: Vec<TermRow>,
}

#[derive(Debug, Deserialize)]
struct EntityRow {
    accession: String,
    symbol: String,
    #[serde(default)]
    name: String,
    chromosome: String,
    start: u64,
    end: u64,
    #[serde(default)]
    strand: Option<String>,
    feature_type: String,
    #[serde(default)]
    synonyms: Vec<SynonymRow>,
}

#[derive(Debug, Deserialize)]
struct SynonymRow {
    text: String,
    #[serde(default)]
    refs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AssociationRow {
    accession: String,
    provider: ProviderKind,
    external_id: String,
}

#[derive(Debug, Deserialize)]
struct TermRow {
    feature_type: String,
    so_id: String,
    so_term: String,
}

pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for JsonCatalog {
    fn load(&self, filter: &FeatureTypeFilter) -> crate::Result<Catalog> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            RegattaError::Catalog(format!("cannot read catalog {}: {}", self.path.display(), e))
        })?;
        let dump: CatalogDump = serde_json::from_str(&contents).map_err(|e| {
            RegattaError::Catalog(format!("malformed catalog {}: {}", self.path.display(), e))
        })?;

        let mut entities = Vec::with_capacity(dump.entities.len());
        for row in dump.entities {
            if !filter.admits(&row.feature_type) {
                continue;
            }
            entities.push(validate_row(row)?);
        }

        // Associations for entities the filter dropped are dropped with them
        let mut associations = Associations::default();
        let admitted: std::collections::HashSet<&str> =
            entities.iter().map(|e| e.accession.as_str()).collect();
        for row in dump.associations {
            if !admitted.contains(row.accession.as_str()) {
                continue;
            }
            associations
                .entry(row.accession)
                .or_default()
                .push(ProviderAssociation {
                    provider: row.provider,
                    external_id: row.external_id,
                });
        }

        let mut term_map = TermMap::default();
        for row in dump.term_map {
            term_map.insert(
                row.feature_type,
                SoTerm {
                    id: row.so_id,
                    name: row.so_term,
                },
            );
        }

        Ok(Catalog::new(entities, associations, term_map))
    }
}

/// Structural checks only; a violating row means the extraction step is
/// broken, so it is fatal rather than skipped.
fn validate_row(row: EntityRow) -> crate::Result<Entity> {
    if row.accession.trim().is_empty() {
        return Err(RegattaError::Parse(
            "catalog row with empty accession".to_string(),
        ));
    }
    if row.start > row.end {
        return Err(RegattaError::Parse(format!(
            "catalog row {}: start {} > end {}",
            row.accession, row.start, row.end
        )));
    }
    Ok(Entity {
        strand: row
            .strand
            .as_deref()
            .map(Strand::parse)
            .unwrap_or(Strand::Unknown),
        accession: row.accession,
        symbol: row.symbol,
        description: row.name,
        chromosome: row.chromosome,
        start: row.start,
        end: row.end,
        feature_type: row.feature_type,
        synonyms: row
            .synonyms
            .into_iter()
            .map(|s| Synonym {
                text: s.text,
                refs: s.refs,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_dump(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    const DUMP: &str = r#"{
        "entities": [
            {
                "accession": "MGI:5663986",
                "symbol": "Rr1",
                "name": "regulatory region 1",
                "chromosome": "5",
                "start": 100,
                "end": 200,
                "strand": "+",
                "feature_type": "enhancer",
                "synonyms": [{"text": "hs123", "refs": ["J:175213"]}]
            },
            {
                "accession": "MGI:5663987",
                "symbol": "Pr2",
                "name": "promoter 2",
                "chromosome": "2",
                "start": 400,
                "end": 900,
                "feature_type": "promoter"
            },
            {
                "accession": "MGI:5663988",
                "symbol": "Ex1",
                "name": "not regulatory",
                "chromosome": "1",
                "start": 1,
                "end": 10,
                "feature_type": "exon"
            }
        ],
        "associations": [
            {"accession": "MGI:5663986", "provider": "ensembl", "external_id": "ENSMUSR00000612461"},
            {"accession": "MGI:5663986", "provider": "ncbi", "external_id": "115487594"},
            {"accession": "MGI:5663988", "provider": "ncbi", "external_id": "999"}
        ],
        "term_map": [
            {"feature_type": "enhancer", "so_id": "SO:0000165", "so_term": "enhancer"}
        ]
    }"#;

    #[test]
    fn test_load_applies_feature_type_filter() {
        let file = write_dump(DUMP);
        let filter = FeatureTypeFilter::new(["enhancer", "promoter"]);
        let catalog = JsonCatalog::new(file.path()).load(&filter).unwrap();

        assert_eq!(catalog.len(), 2);
        // sorted: chr2 before chr5
        assert_eq!(catalog.entities()[0].accession, "MGI:5663987");
        assert_eq!(catalog.entities()[1].accession, "MGI:5663986");

        // the filtered-out exon's association went with it
        assert!(catalog.associations_for("MGI:5663988").is_empty());
        assert_eq!(catalog.associations_for("MGI:5663986").len(), 2);
        assert_eq!(
            catalog.so_term("enhancer").unwrap().id,
            "SO:0000165".to_string()
        );
        assert!(catalog.so_term("promoter").is_none());
    }

    #[test]
    fn test_load_preserves_entity_fields() {
        let file = write_dump(DUMP);
        let catalog = JsonCatalog::new(file.path())
            .load(&FeatureTypeFilter::new(["enhancer"]))
            .unwrap();
        let e = &catalog.entities()[0];
        assert_eq!(e.symbol, "Rr1");
        assert_eq!(e.description, "regulatory region 1");
        assert_eq!(e.strand, Strand::Forward);
        assert_eq!(e.synonyms[0].text, "hs123");
        assert_eq!(e.synonyms[0].refs, vec!["J:175213".to_string()]);
    }

    #[test]
    fn test_missing_catalog_is_fatal() {
        let err = JsonCatalog::new("/nonexistent/catalog.json")
            .load(&FeatureTypeFilter::default())
            .unwrap_err();
        assert!(matches!(err, RegattaError::Catalog(_)));
    }

    #[test]
    fn test_reversed_coordinates_are_fatal() {
        let file = write_dump(
            r#"{"entities": [{"accession": "MGI:1", "symbol": "s", "chromosome": "1",
                "start": 500, "end": 100, "feature_type": "enhancer"}]}"#,
        );
        let err = JsonCatalog::new(file.path())
            .load(&FeatureTypeFilter::default())
            .unwrap_err();
        assert!(matches!(err, RegattaError::Parse(_)));
        assert!(err.to_string().contains("MGI:1"));
    }
}
