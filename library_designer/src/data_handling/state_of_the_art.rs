use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::data_handling::read_off_targets;
use crate::errors::{DesignError, DesignResult};
use crate::helper_functions::Table;
use crate::models::{Dataset, GuideKind, LibraryGuide};

const REQUIRED_COLUMNS: [&str; 5] = ["sgRNA", "library", "gene", "specificity", "cutting_efficiency"];

/// Published genome-wide libraries, all annotated against the same reference
/// and concatenated into one table with a `library` column.
///
/// Library labels are mapped to their publication names; a label missing from
/// the map is an error. A sequence listed twice within one library is kept once.
pub struct StateOfTheArtLibraries {
    pub path: PathBuf,
    pub renames: BTreeMap<String, String>,
}

impl Dataset for StateOfTheArtLibraries {
    type Record = LibraryGuide;

    fn load(&self) -> DesignResult<Vec<LibraryGuide>> {
        let table = Table::read(&self.path)?;
        table.require(&REQUIRED_COLUMNS)?;

        let sgrnas = table.strings("sgRNA")?;
        let libraries = table.strings("library")?;
        let genes = table.strings("gene")?;
        let specificity = table.floats("specificity")?;
        let efficiency = table.floats("cutting_efficiency")?;
        let identifiers = table.optional_strings("identifier")?;
        let chr = table.optional_strings("chr")?;
        let pos = table.optional_integers("pos")?;
        let strands = table.optional_strings("strand")?;
        let off_targets = read_off_targets(&table)?;

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut guides = Vec::with_capacity(table.height());
        for i in 0..table.height() {
            let (Some(sgrna), Some(label)) = (&sgrnas[i], &libraries[i]) else {
                return Err(DesignError::invalid(
                    &table.source,
                    format!("row {i} has no sgRNA or library"),
                ));
            };
            if !seen.insert((sgrna.clone(), label.clone())) {
                continue;
            }
            let library = self.renames.get(label).ok_or_else(|| {
                DesignError::invalid(&table.source, format!("unknown library `{label}`"))
            })?;

            let mut guide = LibraryGuide::new(sgrna.as_str(), GuideKind::GeneTargeting);
            guide.library = Some(library.clone());
            guide.gene = genes[i].clone();
            guide.identifier = identifiers[i].clone();
            guide.chr = chr[i].clone();
            guide.pos = pos[i];
            guide.strand = strands[i].clone();
            guide.specificity = specificity[i];
            guide.cutting_efficiency = efficiency[i];
            guide.off_targets = off_targets[i];
            guides.push(guide);
        }

        info!(
            "Loaded {} state-of-the-art guides ({} duplicates dropped)",
            guides.len(),
            table.height() - guides.len()
        );
        debug!("Libraries: {:?}", self.renames.values().collect::<Vec<_>>());
        Ok(guides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScreenConfig;
    use std::io::Write;

    fn source(contents: &str) -> (tempfile::NamedTempFile, StateOfTheArtLibraries) {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{contents}").unwrap();
        let source = StateOfTheArtLibraries {
            path: file.path().into(),
            renames: ScreenConfig::default().library_renames,
        };
        (file, source)
    }

    #[test]
    fn renames_and_deduplicates() {
        let (_file, source) = source(
            "sgRNA,library,gene,specificity,cutting_efficiency,0 Off-Targets,1 Off-Targets\n\
             AAAA,Bassik,TP53,0.5,0.4,1,3\n\
             AAAA,Bassik,TP53,0.5,0.4,1,3\n\
             AAAA,Hart,TP53,0.5,0.4,,\n\
             CCCC,Doench,MYC,0.2,0.6,,",
        );

        let guides = source.load().unwrap();
        assert_eq!(guides.len(), 3);
        assert_eq!(guides[0].library.as_deref(), Some("Bassik2017"));
        assert_eq!(guides[0].off_targets.total(), 4);
        assert_eq!(guides[1].library.as_deref(), Some("Moffat2015"));
        assert_eq!(guides[1].off_targets.0[0], None);
        assert_eq!(guides[2].library.as_deref(), Some("Root2016"));
        assert_eq!(guides[2].gene.as_deref(), Some("MYC"));
    }

    #[test]
    fn unknown_library_label() {
        let (_file, source) = source(
            "sgRNA,library,gene,specificity,cutting_efficiency\n\
             AAAA,Mystery,TP53,0.5,0.4",
        );
        let err = source.load().unwrap_err();
        assert!(err.to_string().contains("Mystery"));
    }
}
