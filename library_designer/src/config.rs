//! Tunable constants for both pipelines.
//!
//! Every field has a default, so a JSON override file only needs to name the
//! values it changes:
//!
//! ```json
//! { "library": { "guides_per_gene": 4 }, "screen": { "seed": 11 } }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::DesignResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub library: LibraryConfig,
    pub screen: ScreenConfig,
}

/// Constants of the filter → rank → select pipeline and the source adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Candidates at or below this predicted cutting efficiency are dropped.
    pub min_cutting_efficiency: f64,
    /// Candidates at or below this specificity are dropped.
    pub min_specificity: f64,
    pub min_gc_content: f64,
    pub max_gc_content: f64,
    pub homopolymer_length: usize,
    /// Weight on cutting efficiency in `min(specificity, w * efficiency)`.
    pub efficiency_weight: f64,
    pub guides_per_gene: usize,
    /// Length of the source-specific prefix on gene symbols and identifiers.
    pub gene_prefix_len: usize,
    pub pam_len: usize,
    pub pam: String,
    pub safe_targeting_pool: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            min_cutting_efficiency: 0.25,
            min_specificity: 0.20,
            min_gc_content: 0.20,
            max_gc_content: 0.80,
            homopolymer_length: 4,
            efficiency_weight: 1.25,
            guides_per_gene: 6,
            gene_prefix_len: 5,
            pam_len: 3,
            pam: "NGG".to_string(),
            safe_targeting_pool: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub num_essential: usize,
    pub num_non_essential: usize,
    pub num_controls: usize,
    /// Number of most highly expressed genes treated as "expressed".
    pub expression_threshold: usize,
    pub expression_columns: Vec<String>,
    pub expression_gene_column: String,
    pub non_essential_column: String,
    pub seed: u64,
    /// Upper bound (inclusive) of the control sub-seeds drawn from `seed`.
    pub sub_seed_max: u64,
    pub safe_targeting_pool: usize,
    pub reference_library: String,
    /// Library whose non-essential guides are chosen by off-target load.
    pub off_target_library: String,
    pub library_renames: BTreeMap<String, String>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        let library_renames = [
            ("Doench", "Root2016"),
            ("Hart", "Moffat2015"),
            ("Bassik", "Bassik2017"),
            ("Zuber2020", "Elling2020"),
            ("Sabatini", "Sabatini2015"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        Self {
            num_essential: 100,
            num_non_essential: 135,
            num_controls: 100,
            expression_threshold: 5000,
            expression_columns: vec![
                "A549_Vehicle_Lung_1_A01".to_string(),
                "A549_Vehicle_Lung_2_A05".to_string(),
            ],
            expression_gene_column: "Gene_name".to_string(),
            non_essential_column: "Nonessential Genes (NE)".to_string(),
            seed: 74,
            sub_seed_max: 1000,
            safe_targeting_pool: 5000,
            reference_library: "Guidescan".to_string(),
            off_target_library: "Bassik2017".to_string(),
            library_renames,
        }
    }
}

impl DesignConfig {
    /// Defaults, optionally overridden by a JSON file.
    pub fn load(path: Option<&Path>) -> DesignResult<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                info!("Reading configuration from {}", path.display());
                let reader = BufReader::new(File::open(path)?);
                let config = serde_json::from_reader(reader).map_err(std::io::Error::from)?;
                Ok(config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_override_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "library": {{ "guides_per_gene": 4 }}, "screen": {{ "seed": 11 }} }}"#).unwrap();

        let config = DesignConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.library.guides_per_gene, 4);
        assert_eq!(config.library.pam_len, 3);
        assert_eq!(config.screen.seed, 11);
        assert_eq!(config.screen.num_controls, 100);
        assert_eq!(config.screen.library_renames["Hart"], "Moffat2015");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(DesignConfig::load(Some(file.path())).is_err());
    }
}
