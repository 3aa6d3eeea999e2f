//! Catalog/lookup structures built once before synthesis.
//!
//! The relational catalog itself lives upstream; this module only consumes a
//! read-only dump of it through the [`CatalogSource`] seam and arranges the
//! rows the way the synthesizer needs them: entities in ascending
//! (chromosome, start) order, provider associations keyed by entity
//! accession, and the feature-type to SO term translation map.

mod json;
pub use json::JsonCatalog;

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::providers::ProviderKind;

/// Strand as reported by the catalog or a provider file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }

    /// Column 7 representation; unknown strands degrade to the placeholder
    pub fn as_gff(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        }
    }
}

/// One synonym string, optionally backed by literature reference ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synonym {
    pub text: String,
    pub refs: Vec<String>,
}

impl Synonym {
    /// Rendering used in the `Synonym` output attribute: the text, suffixed
    /// with its reference ids in bracketed form when any exist.
    pub fn render(&self) -> String {
        if self.refs.is_empty() {
            self.text.clone()
        } else {
            format!("{} [{}]", self.text, self.refs.join("|"))
        }
    }
}

/// One curated regulatory feature row. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Stable curie, e.g. `MGI:5663986`
    pub accession: String,
    pub symbol: String,
    pub description: String,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    /// Internal feature-type vocabulary term
    pub feature_type: String,
    pub synonyms: Vec<Synonym>,
}

/// Entity-to-provider link carrying the provider's accession
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAssociation {
    pub provider: ProviderKind,
    pub external_id: String,
}

/// Sequence Ontology term a feature-type code translates to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoTerm {
    pub id: String,
    pub name: String,
}

pub type Associations = IndexMap<String, Vec<ProviderAssociation>>;
pub type TermMap = IndexMap<String, SoTerm>;

/// The read-only lookup structures the synthesizer runs against
#[derive(Debug, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
    associations: Associations,
    term_map: TermMap,
}

impl Catalog {
    /// Assemble a catalog, sorting entities into output order
    pub fn new(mut entities: Vec<Entity>, associations: Associations, term_map: TermMap) -> Self {
        entities.sort_by(|a, b| {
            compare_chromosomes(&a.chromosome, &b.chromosome)
                .then_with(|| a.start.cmp(&b.start))
                .then_with(|| a.end.cmp(&b.end))
                .then_with(|| a.accession.cmp(&b.accession))
        });
        Self {
            entities,
            associations,
            term_map,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Provider associations for one entity; empty when internal-only
    pub fn associations_for(&self, accession: &str) -> &[ProviderAssociation] {
        self.associations
            .get(accession)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Feature-type to SO term translation; `None` is not an error
    pub fn so_term(&self, feature_type: &str) -> Option<&SoTerm> {
        self.term_map.get(feature_type)
    }
}

/// Admission filter over the closed regulatory feature-type list.
/// An empty filter admits everything.
#[derive(Debug, Clone, Default)]
pub struct FeatureTypeFilter {
    admitted: HashSet<String>,
}

impl FeatureTypeFilter {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admitted: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn admits(&self, feature_type: &str) -> bool {
        self.admitted.is_empty() || self.admitted.contains(feature_type)
    }
}

/// Read-only seam over whatever supplies the catalog rows
pub trait CatalogSource {
    fn load(&self, filter: &FeatureTypeFilter) -> crate::Result<Catalog>;
}

/// Karyotype ordering: numbered chromosomes first, then X, Y, MT,
/// then anything else (scaffolds, patches) lexicographically.
pub fn compare_chromosomes(a: &str, b: &str) -> Ordering {
    chromosome_rank(a).cmp(&chromosome_rank(b))
}

fn chromosome_rank(chrom: &str) -> (u8, u32, String) {
    let c = chrom.trim();
    if let Ok(n) = c.parse::<u32>() {
        return (0, n, String::new());
    }
    if c.eq_ignore_ascii_case("X") {
        return (1, 0, String::new());
    }
    if c.eq_ignore_ascii_case("Y") {
        return (2, 0, String::new());
    }
    if c.eq_ignore_ascii_case("MT") || c.eq_ignore_ascii_case("M") {
        return (3, 0, String::new());
    }
    (4, 0, c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entity(accession: &str, chromosome: &str, start: u64) -> Entity {
        Entity {
            accession: accession.to_string(),
            symbol: format!("Sym-{}", accession),
            description: String::new(),
            chromosome: chromosome.to_string(),
            start,
            end: start + 100,
            strand: Strand::Unknown,
            feature_type: "enhancer".to_string(),
            synonyms: vec![],
        }
    }

    #[test]
    fn test_chromosome_ordering_is_karyotypic() {
        let mut chroms = vec!["X", "10", "2", "MT", "1", "Y", "GL456210.1"];
        chroms.sort_by(|a, b| compare_chromosomes(a, b));
        assert_eq!(chroms, vec!["1", "2", "10", "X", "Y", "MT", "GL456210.1"]);
    }

    #[test]
    fn test_entities_sorted_by_chromosome_then_start() {
        let catalog = Catalog::new(
            vec![
                entity("MGI:3", "2", 50),
                entity("MGI:1", "1", 900),
                entity("MGI:2", "1", 100),
                entity("MGI:4", "X", 10),
            ],
            Associations::default(),
            TermMap::default(),
        );
        let order: Vec<&str> = catalog
            .entities()
            .iter()
            .map(|e| e.accession.as_str())
            .collect();
        assert_eq!(order, vec!["MGI:2", "MGI:1", "MGI:3", "MGI:4"]);
    }

    #[test]
    fn test_associations_default_to_empty() {
        let catalog = Catalog::new(vec![], Associations::default(), TermMap::default());
        assert!(catalog.associations_for("MGI:404").is_empty());
    }

    #[test]
    fn test_feature_type_filter() {
        let filter = FeatureTypeFilter::new(["enhancer", "promoter"]);
        assert!(filter.admits("enhancer"));
        assert!(!filter.admits("exon"));

        let open = FeatureTypeFilter::default();
        assert!(open.admits("anything"));
    }

    #[test]
    fn test_synonym_rendering() {
        let plain = Synonym {
            text: "m5Reg".to_string(),
            refs: vec![],
        };
        assert_eq!(plain.render(), "m5Reg");

        let cited = Synonym {
            text: "hs1234".to_string(),
            refs: vec!["J:175213".to_string(), "J:98765".to_string()],
        };
        assert_eq!(cited.render(), "hs1234 [J:175213|J:98765]");
    }

    #[test]
    fn test_strand_round_trip() {
        assert_eq!(Strand::parse("+").as_gff(), "+");
        assert_eq!(Strand::parse("-").as_gff(), "-");
        assert_eq!(Strand::parse("").as_gff(), ".");
        assert_eq!(Strand::parse("?").as_gff(), ".");
    }
}
