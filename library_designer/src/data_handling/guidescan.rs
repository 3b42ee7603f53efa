use std::path::PathBuf;

use tracing::debug;

use crate::config::LibraryConfig;
use crate::errors::{DesignError, DesignResult};
use crate::helper_functions::{strip_prefix_chars, strip_suffix_chars, Table};
use crate::models::{Candidate, Dataset, LocusType};

const REQUIRED_COLUMNS: [&str; 11] = [
    "gene",
    "identifier",
    "sgRNA",
    "specificity",
    "5pG Specificity",
    "cutting_efficiency",
    "type",
    "chr",
    "pos",
    "strand",
    "id",
];

/// Guidescan-processed CDS/exon cutting candidates.
///
/// Gene symbols and identifiers carry a fixed-width prefix and every sgRNA
/// still has its PAM attached.
pub struct GuidescanCandidates {
    pub path: PathBuf,
    pub prefix_len: usize,
    pub pam_len: usize,
    pub pam: String,
}

impl GuidescanCandidates {
    pub fn new(path: impl Into<PathBuf>, config: &LibraryConfig) -> Self {
        Self {
            path: path.into(),
            prefix_len: config.gene_prefix_len,
            pam_len: config.pam_len,
            pam: config.pam.clone(),
        }
    }
}

impl Dataset for GuidescanCandidates {
    type Record = Candidate;

    fn load(&self) -> DesignResult<Vec<Candidate>> {
        let table = Table::read(&self.path)?;
        table.require(&REQUIRED_COLUMNS)?;

        let genes = table.strings("gene")?;
        let identifiers = table.strings("identifier")?;
        let sgrnas = table.strings("sgRNA")?;
        let specificity = table.floats("specificity")?;
        let secondary = table.floats("5pG Specificity")?;
        let efficiency = table.floats("cutting_efficiency")?;
        let locus = table.strings("type")?;
        let chr = table.strings("chr")?;
        let pos = table.integers("pos")?;
        let strand = table.strings("strand")?;
        let region = table.strings("id")?;

        let mut candidates = Vec::with_capacity(table.height());
        for i in 0..table.height() {
            let (Some(gene), Some(sgrna)) = (&genes[i], &sgrnas[i]) else {
                return Err(DesignError::invalid(
                    &table.source,
                    format!("row {i} has no gene or sgRNA"),
                ));
            };

            let mut candidate = Candidate::new(
                strip_prefix_chars(gene, self.prefix_len),
                strip_suffix_chars(sgrna, self.pam_len),
                specificity[i].unwrap_or(f64::NAN),
                secondary[i],
                efficiency[i].unwrap_or(f64::NAN),
                LocusType::parse(locus[i].as_deref().unwrap_or_default()),
            );
            candidate.identifier = identifiers[i]
                .as_deref()
                .map(|id| strip_prefix_chars(id, self.prefix_len))
                .unwrap_or_default();
            candidate.pam = self.pam.clone();
            candidate.chr = chr[i].clone();
            candidate.pos = pos[i];
            candidate.strand = strand[i].clone();
            candidate.region_id = region[i].clone();
            candidates.push(candidate);
        }

        debug!("Loaded {} Guidescan candidates", candidates.len());
        Ok(candidates)
    }
}
