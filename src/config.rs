use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::providers::ProviderKind;

/// Run configuration for one generation batch.
///
/// The provider list is ordered as it appears in the file; record priority
/// during synthesis comes from the provider registry, not from this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub assembly: AssemblyConfig,
    pub catalog: CatalogConfig,
    #[serde(rename = "provider")]
    pub providers: Vec<ProviderFileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Genome build stamped into the output header
    pub genome_build: String,
    /// NCBI taxonomy id of the organism
    pub taxon_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the catalog dump produced by the upstream extraction step
    pub path: PathBuf,
    /// Closed list of regulatory feature types admitted from the catalog.
    /// An empty list admits every feature type in the dump.
    pub feature_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFileConfig {
    pub kind: ProviderKind,
    /// Local annotation file; `.gz` files are decompressed transparently
    pub file: PathBuf,
    /// Source URL recorded in the output header
    pub url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assembly: AssemblyConfig {
                genome_build: "GRCm39".to_string(),
                taxon_id: 10090,
            },
            catalog: CatalogConfig {
                path: PathBuf::from("catalog.json"),
                feature_types: [
                    "enhancer",
                    "promoter",
                    "silencer",
                    "insulator",
                    "TF binding site",
                    "CTCF binding site",
                    "open chromatin region",
                    "histone modification",
                    "locus control region",
                    "imprinting control region",
                    "response element",
                    "regulatory region",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
            providers: vec![
                ProviderFileConfig {
                    kind: ProviderKind::Ncbi,
                    file: PathBuf::from("ncbi_regulatory.gff.gz"),
                    url: Some(
                        "https://ftp.ncbi.nlm.nih.gov/genomes/all/GCF/000/001/635/".to_string(),
                    ),
                },
                ProviderFileConfig {
                    kind: ProviderKind::Ensembl,
                    file: PathBuf::from("mus_musculus.GRCm39.Regulatory_Build.regulatory_features.gff.gz"),
                    url: Some(
                        "https://ftp.ensembl.org/pub/current_regulation/mus_musculus/".to_string(),
                    ),
                },
                ProviderFileConfig {
                    kind: ProviderKind::Vista,
                    file: PathBuf::from("vista_enhancers.gff"),
                    url: Some("https://enhancer.lbl.gov/".to_string()),
                },
            ],
        }
    }
}

impl Config {
    /// Configured file entry for one provider, if any
    pub fn provider_file(&self, kind: ProviderKind) -> Option<&ProviderFileConfig> {
        self.providers.iter().find(|p| p.kind == kind)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::RegattaError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        crate::RegattaError::Config(format!("cannot read config {}: {}", path.display(), e))
    })?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::RegattaError::Config(format!("failed to parse config: {}", e)))?;
    Ok(config)
}
