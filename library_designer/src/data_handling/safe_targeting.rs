use std::path::PathBuf;

use tracing::debug;

use crate::config::LibraryConfig;
use crate::errors::{DesignError, DesignResult};
use crate::helper_functions::{strip_suffix_chars, Table};
use crate::models::{ControlKind, Dataset, GuideKind, LibraryGuide};

const REQUIRED_COLUMNS: [&str; 8] = [
    "sgRNA",
    "chr",
    "start",
    "end",
    "antisense",
    "specificity",
    "cutting_efficiency",
    "safe_targeting_region",
];

/// Guides cutting in genomic "safe harbour" regions.
///
/// Only the `pool_size` most specific guides are kept; they are returned in
/// descending specificity order.
pub struct SafeTargetingControls {
    pub path: PathBuf,
    pub pam_len: usize,
    pub pam: String,
    pub pool_size: usize,
}

impl SafeTargetingControls {
    pub fn new(path: impl Into<PathBuf>, config: &LibraryConfig) -> Self {
        Self {
            path: path.into(),
            pam_len: config.pam_len,
            pam: config.pam.clone(),
            pool_size: config.safe_targeting_pool,
        }
    }
}

/// Stable sort by specificity, highest first, unscored guides last; keep `n`.
pub fn most_specific(mut guides: Vec<LibraryGuide>, n: usize) -> Vec<LibraryGuide> {
    guides.sort_by(|a, b| match (a.specificity, b.specificity) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    guides.truncate(n);
    guides
}

impl Dataset for SafeTargetingControls {
    type Record = LibraryGuide;

    fn load(&self) -> DesignResult<Vec<LibraryGuide>> {
        let table = Table::read(&self.path)?;
        table.require(&REQUIRED_COLUMNS)?;

        let sgrnas = table.strings("sgRNA")?;
        let chr = table.strings("chr")?;
        let start = table.integers("start")?;
        let antisense = table.booleans("antisense")?;
        let specificity = table.floats("specificity")?;
        let efficiency = table.floats("cutting_efficiency")?;
        let region = table.strings("safe_targeting_region")?;

        let mut guides = Vec::with_capacity(table.height());
        for i in 0..table.height() {
            let sgrna = sgrnas[i].as_deref().ok_or_else(|| {
                DesignError::invalid(&table.source, format!("row {i} has no sgRNA"))
            })?;

            let mut guide = LibraryGuide::new(
                strip_suffix_chars(sgrna, self.pam_len),
                GuideKind::Control(ControlKind::SafeTargeting),
            );
            guide.pam = Some(self.pam.clone());
            guide.strand = Some(if antisense[i] { "-" } else { "+" }.to_string());
            guide.chr = chr[i].clone();
            guide.pos = start[i];
            guide.specificity = specificity[i];
            guide.cutting_efficiency = efficiency[i];
            guide.safe_targeting_region = region[i].clone();
            guides.push(guide);
        }

        let total = guides.len();
        let pool = most_specific(guides, self.pool_size);
        debug!("Kept {} of {} safe-targeting controls", pool.len(), total);
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn keeps_most_specific_pool() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "chr,start,end,antisense,specificity,cutting_efficiency,safe_targeting_region,sgRNA\n\
             chr1,100,123,True,0.5,0.4,r1,AAAAACCCCCGGGGGTTTTTAGG\n\
             chr1,200,223,False,0.9,0.4,r1,CCCCCGGGGGTTTTTAAAAATGG\n\
             chr2,300,323,False,0.7,0.4,r2,GGGGGTTTTTAAAAACCCCCCGG"
        )
        .unwrap();

        let mut config = LibraryConfig::default();
        config.safe_targeting_pool = 2;
        let guides = SafeTargetingControls::new(file.path(), &config).load().unwrap();

        assert_eq!(guides.len(), 2);
        assert_eq!(guides[0].specificity, Some(0.9));
        assert_eq!(guides[0].sgrna, "CCCCCGGGGGTTTTTAAAAA");
        assert_eq!(guides[0].strand.as_deref(), Some("+"));
        assert_eq!(guides[0].pos, Some(200));
        assert_eq!(guides[1].specificity, Some(0.7));
        assert!(guides.iter().all(|g| g.is_control(ControlKind::SafeTargeting)));
    }

    #[test]
    fn antisense_guides_are_on_minus_strand() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "chr,start,end,antisense,specificity,cutting_efficiency,safe_targeting_region,sgRNA\n\
             chr1,100,123,True,0.5,0.4,r1,AAAAACCCCCGGGGGTTTTTAGG"
        )
        .unwrap();

        let guides = SafeTargetingControls::new(file.path(), &LibraryConfig::default())
            .load()
            .unwrap();
        assert_eq!(guides[0].strand.as_deref(), Some("-"));
        assert_eq!(guides[0].pam.as_deref(), Some("NGG"));
    }
}
