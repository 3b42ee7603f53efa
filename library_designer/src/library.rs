//! Library construction: the best Guidescan guides per gene plus both kinds
//! of control.

use std::path::PathBuf;

use tracing::info;

use crate::config::LibraryConfig;
use crate::data_handling::guidescan::GuidescanCandidates;
use crate::data_handling::non_targeting::NonTargetingControls;
use crate::data_handling::safe_targeting::SafeTargetingControls;
use crate::errors::DesignResult;
use crate::models::{Candidate, Dataset, LibraryGuide, LocusType};
use crate::selection::{filter_candidates, rank_candidates, select_top_k};

pub struct LibraryInputs {
    pub guidescan_csv: PathBuf,
    pub safe_targeting_csv: PathBuf,
    pub non_targeting_txt: PathBuf,
}

/// Filter → rank → top-k per gene, flattened in gene order.
pub fn gene_targeting_guides(
    candidates: Vec<Candidate>,
    config: &LibraryConfig,
    verbose: bool,
) -> Vec<LibraryGuide> {
    if verbose {
        let exon = candidates.iter().filter(|c| c.locus_type == LocusType::Exon).count();
        let cds = candidates.iter().filter(|c| c.locus_type == LocusType::Cds).count();
        info!("Candidates: {} exon and {} CDS cutting sgRNAs", exon, cds);
    }

    let filtered = filter_candidates(candidates, config, verbose);
    let ranked = rank_candidates(filtered, config, verbose);
    select_top_k(ranked, config.guides_per_gene, verbose)
        .into_values()
        .flatten()
        .map(LibraryGuide::from)
        .collect()
}

pub fn design_library(
    inputs: &LibraryInputs,
    config: &LibraryConfig,
    verbose: bool,
) -> DesignResult<Vec<LibraryGuide>> {
    let candidates = GuidescanCandidates::new(&inputs.guidescan_csv, config).load()?;
    let non_targeting = NonTargetingControls {
        path: inputs.non_targeting_txt.clone(),
    }
    .load()?;
    let safe_targeting = SafeTargetingControls::new(&inputs.safe_targeting_csv, config).load()?;

    let mut library = gene_targeting_guides(candidates, config, verbose);
    let n_gene_targeting = library.len();
    library.extend(non_targeting);
    library.extend(safe_targeting);

    for guide in &mut library {
        guide.refresh_gc_content();
    }

    info!(
        "Library: {} gene-targeting guides and {} controls",
        n_gene_targeting,
        library.len() - n_gene_targeting
    );
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuideKind;
    use std::io::Write;

    #[test]
    fn end_to_end_from_files() {
        let mut guidescan = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            guidescan,
            "gene,identifier,sgRNA,specificity,5pG Specificity,cutting_efficiency,type,chr,pos,strand,id\n\
             gene:G1,gene:G1,ACGTACGTACGTACGTACGTAGG,0.95,0.9,0.9,CDS,chr1,10,+,a\n\
             gene:G1,gene:G1,ACGTACGTACGTACGTACGTTGG,0.9,0.5,0.9,exon,chr1,20,+,b\n\
             gene:G1,gene:G1,ACGTACGTACGTACGTACGTCGG,0.9,0.4,0.9,CDS,chr1,30,+,c\n\
             gene:G1,gene:G1,ACGTACGTACGTACGTACGTGGG,0.9,,0.9,CDS,chr1,40,+,d\n\
             gene:G2,gene:G2,ACGTACGTACGTACGTACGTAGG,0.1,0.9,0.9,CDS,chr2,10,-,e"
        )
        .unwrap();

        let mut safe = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            safe,
            "chr,start,end,antisense,specificity,cutting_efficiency,safe_targeting_region,sgRNA\n\
             chr1,100,123,False,0.9,0.4,r1,CCCCCGGGGGTTTTTAAAAATGG"
        )
        .unwrap();

        let mut non_targeting = tempfile::NamedTempFile::new().unwrap();
        writeln!(non_targeting, "GGGGCCCCAAAATTTTACGT").unwrap();

        let inputs = LibraryInputs {
            guidescan_csv: guidescan.path().into(),
            safe_targeting_csv: safe.path().into(),
            non_targeting_txt: non_targeting.path().into(),
        };
        let library = design_library(&inputs, &LibraryConfig::default(), true).unwrap();

        let gene_targeting: Vec<&LibraryGuide> = library
            .iter()
            .filter(|g| g.kind == GuideKind::GeneTargeting)
            .collect();
        // d has no 5pG score, e fails the specificity floor
        let regions: Vec<&str> = gene_targeting
            .iter()
            .map(|g| g.cutting_region_id.as_deref().unwrap())
            .collect();
        assert_eq!(regions, vec!["a", "c", "b"]);
        assert_eq!(gene_targeting[2].cuts_in.as_deref(), Some("exon"));
        assert_eq!(library.len(), 5);
        assert_eq!(library[3].kind.as_str(), "non_targeting_control");
        assert_eq!(library[4].kind.as_str(), "safe_targeting_control");
    }
}
