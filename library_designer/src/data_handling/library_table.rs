use std::path::PathBuf;

use tracing::debug;

use crate::data_handling::read_off_targets;
use crate::errors::{DesignError, DesignResult};
use crate::helper_functions::Table;
use crate::models::{Dataset, GuideKind, LibraryGuide};

/// A library previously written by `design-library`, read back as one named
/// library of the screen.
pub struct GuideLibraryTable {
    pub path: PathBuf,
    pub library: String,
}

impl Dataset for GuideLibraryTable {
    type Record = LibraryGuide;

    fn load(&self) -> DesignResult<Vec<LibraryGuide>> {
        let table = Table::read(&self.path)?;
        table.require(&["sgRNA", "Type"])?;

        let sgrnas = table.strings("sgRNA")?;
        let kinds = table.strings("Type")?;
        let genes = table.optional_strings("Gene")?;
        let identifiers = table.optional_strings("Identifier")?;
        let pams = table.optional_strings("PAM")?;
        let strands = table.optional_strings("Strand")?;
        let chr = table.optional_strings("Chr")?;
        let pos = table.optional_integers("Pos")?;
        let specificity = table.optional_floats("Specificity")?;
        let secondary = table.optional_floats("5pG Specificity")?;
        let efficiency = table.optional_floats("Cutting Efficiency")?;
        let cuts_in = table.optional_strings("Cuts In")?;
        let region_ids = table.optional_strings("Cutting Region ID")?;
        let safe_regions = table.optional_strings("Safe Targeting Region")?;
        let off_targets = read_off_targets(&table)?;

        let mut guides = Vec::with_capacity(table.height());
        for i in 0..table.height() {
            let sgrna = sgrnas[i].as_deref().ok_or_else(|| {
                DesignError::invalid(&table.source, format!("row {i} has no sgRNA"))
            })?;
            let kind = GuideKind::parse(&table.source, kinds[i].as_deref().unwrap_or_default())?;

            let mut guide = LibraryGuide::new(sgrna, kind);
            guide.library = Some(self.library.clone());
            guide.gene = genes[i].clone();
            guide.identifier = identifiers[i].clone();
            guide.pam = pams[i].clone();
            guide.strand = strands[i].clone();
            guide.chr = chr[i].clone();
            guide.pos = pos[i];
            guide.specificity = specificity[i];
            guide.secondary_specificity = secondary[i];
            guide.cutting_efficiency = efficiency[i];
            guide.cuts_in = cuts_in[i].clone();
            guide.cutting_region_id = region_ids[i].clone();
            guide.safe_targeting_region = safe_regions[i].clone();
            guide.off_targets = off_targets[i];
            // each designed guide matches its own site exactly once
            if kind == GuideKind::GeneTargeting {
                guide.off_targets.0[0] = Some(1);
            }
            guides.push(guide);
        }

        debug!("Loaded {} guides for library {}", guides.len(), self.library);
        Ok(guides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ControlKind;
    use std::io::Write;

    #[test]
    fn reads_back_designed_library() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "Gene,Identifier,sgRNA,PAM,Specificity,Type,0 Off-Targets,1 Off-Targets\n\
             TP53,TP53-1,ACGTACGTACGTACGTACGT,NGG,0.9,gene_targeting,,\n\
             ,,GGGGCCCCAAAATTTTACGT,,,non_targeting_control,0,0"
        )
        .unwrap();

        let guides = GuideLibraryTable { path: file.path().into(), library: "Guidescan".into() }
            .load()
            .unwrap();

        assert_eq!(guides.len(), 2);
        assert_eq!(guides[0].library.as_deref(), Some("Guidescan"));
        assert_eq!(guides[0].gene.as_deref(), Some("TP53"));
        assert_eq!(guides[0].off_targets.0[0], Some(1));
        assert_eq!(guides[0].off_targets.0[1], None);
        assert_eq!(guides[1].gene, None);
        assert!(guides[1].is_control(ControlKind::NonTargeting));
        assert_eq!(guides[1].off_targets.0[0], Some(0));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "sgRNA,Type\nACGT,mystery").unwrap();

        let err = GuideLibraryTable { path: file.path().into(), library: "Guidescan".into() }
            .load()
            .unwrap_err();
        assert!(matches!(err, DesignError::InvalidValue { .. }));
    }
}
