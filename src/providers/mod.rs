//! Provider descriptors and the per-provider coordinate index.
//!
//! Each external annotation source is described by a [`ProviderSpec`]: its
//! synthesis priority, how its record lines are selected, how the external
//! identifier is extracted, and which columns carry the coordinates. The
//! synthesizer iterates the registry instead of branching per provider, so
//! adding a source means adding a descriptor here.

mod indexer;
pub use indexer::{index_provider, open_provider_file, IndexStats, ProviderIndex, ProviderInterval};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ncbi,
    Ensembl,
    Vista,
}

impl ProviderKind {
    pub fn spec(&self) -> &'static ProviderSpec {
        registry()
            .iter()
            .find(|s| s.kind == *self)
            .expect("every provider kind has a registry entry")
    }

    pub fn label(&self) -> &'static str {
        self.spec().label
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ncbi" => Ok(ProviderKind::Ncbi),
            "ensembl" => Ok(ProviderKind::Ensembl),
            "vista" => Ok(ProviderKind::Vista),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// How many intervals a provider is expected to report per external id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// Which data lines of a provider file count as records
#[derive(Debug, Clone, Copy)]
pub enum LineSelector {
    /// Every non-comment line
    Any,
    /// Lines whose Dbxref attribute carries an entry with this prefix
    Dbxref { prefix: &'static str },
    /// Lines whose source column equals the sentinel and whose Dbxref
    /// attribute carries an entry with this prefix
    SourceAndDbxref {
        source: &'static str,
        prefix: &'static str,
    },
}

/// How the external identifier is pulled out of a selected line
#[derive(Debug, Clone, Copy)]
pub enum IdRule {
    /// `ID=<feature class>:<accession>`, taking the token after the last colon
    IdAttributeLastColon,
    /// Dbxref entry `<prefix><id>`, truncated at the next delimiter
    DbxrefPrefix(&'static str),
}

/// Named start/end mapping, 1-based GFF column numbers.
/// Declared per provider so a source with a nonstandard column contract
/// gets an explicit, reviewable entry instead of a silent swap.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateColumns {
    pub start: usize,
    pub end: usize,
}

/// GFF3 column contract: column 4 is start, column 5 is end
pub const GFF3_COORDS: CoordinateColumns = CoordinateColumns { start: 4, end: 5 };

#[derive(Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    pub label: &'static str,
    /// Synthesis priority; lower wins. Ordering in [`registry`] matches.
    pub priority: u8,
    pub cardinality: Cardinality,
    pub selector: LineSelector,
    pub id_rule: IdRule,
    pub coords: CoordinateColumns,
}

const REGISTRY: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::Ncbi,
        label: "NCBI",
        priority: 1,
        cardinality: Cardinality::Many,
        selector: LineSelector::SourceAndDbxref {
            source: "RefSeqFE",
            prefix: "GeneID:",
        },
        id_rule: IdRule::DbxrefPrefix("GeneID:"),
        coords: GFF3_COORDS,
    },
    ProviderSpec {
        kind: ProviderKind::Ensembl,
        label: "ENSEMBL",
        priority: 2,
        cardinality: Cardinality::Many,
        selector: LineSelector::Any,
        id_rule: IdRule::IdAttributeLastColon,
        coords: GFF3_COORDS,
    },
    ProviderSpec {
        kind: ProviderKind::Vista,
        label: "VISTA",
        priority: 3,
        cardinality: Cardinality::One,
        selector: LineSelector::Dbxref { prefix: "VISTA:" },
        id_rule: IdRule::DbxrefPrefix("VISTA:"),
        coords: GFF3_COORDS,
    },
];

/// All known providers in ascending priority order
pub fn registry() -> &'static [ProviderSpec] {
    REGISTRY
}

/// Per-provider indices built before synthesis, immutable afterwards
#[derive(Debug, Default)]
pub struct ProviderIndices {
    map: IndexMap<ProviderKind, ProviderIndex>,
}

impl ProviderIndices {
    pub fn insert(&mut self, kind: ProviderKind, index: ProviderIndex) {
        self.map.insert(kind, index);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderIndex> {
        self.map.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_is_priority_ordered_and_complete() {
        let priorities: Vec<u8> = registry().iter().map(|s| s.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);

        for kind in [ProviderKind::Ncbi, ProviderKind::Ensembl, ProviderKind::Vista] {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn test_coordinate_columns_follow_gff3_contract() {
        // A provider with a nonstandard column contract gets its own
        // mapping; every current provider follows the GFF3 contract.
        for spec in registry() {
            assert_eq!(spec.coords.start, 4, "{} start column", spec.label);
            assert_eq!(spec.coords.end, 5, "{} end column", spec.label);
        }
    }

    #[test]
    fn test_provider_kind_round_trip() {
        for (text, kind) in [
            ("ncbi", ProviderKind::Ncbi),
            ("ENSEMBL", ProviderKind::Ensembl),
            ("Vista", ProviderKind::Vista),
        ] {
            assert_eq!(text.parse::<ProviderKind>().unwrap(), kind);
        }
        assert!("ucsc".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::Ensembl.to_string(), "ENSEMBL");
    }
}
