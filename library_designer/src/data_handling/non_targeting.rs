use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::errors::DesignResult;
use crate::models::{ControlKind, Dataset, GuideKind, LibraryGuide, OffTargetCounts};

/// Newline-delimited sequences with no header. Blank lines are skipped.
pub struct NonTargetingControls {
    pub path: PathBuf,
}

impl Dataset for NonTargetingControls {
    type Record = LibraryGuide;

    fn load(&self) -> DesignResult<Vec<LibraryGuide>> {
        info!("Reading non-targeting controls from {}", self.path.display());
        let reader = BufReader::new(File::open(&self.path)?);

        let mut guides = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let sequence = line.trim();
            if sequence.is_empty() {
                continue;
            }
            let mut guide =
                LibraryGuide::new(sequence, GuideKind::Control(ControlKind::NonTargeting));
            guide.off_targets = OffTargetCounts::zero();
            guides.push(guide);
        }

        debug!("Loaded {} non-targeting controls", guides.len());
        Ok(guides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn one_guide_per_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ACGTACGTACGTACGTACGT\n\nGGGGCCCCAAAATTTTACGT\n").unwrap();

        let guides = NonTargetingControls { path: file.path().into() }.load().unwrap();
        assert_eq!(guides.len(), 2);
        assert_eq!(guides[1].sgrna, "GGGGCCCCAAAATTTTACGT");
        assert_eq!(guides[0].off_targets.total(), 0);
        assert_eq!(guides[0].off_targets.0[3], Some(0));
        assert!(guides[0].is_control(ControlKind::NonTargeting));
    }

    #[test]
    fn missing_file_is_an_error() {
        let source = NonTargetingControls { path: "/nonexistent/controls.txt".into() };
        assert!(source.load().is_err());
    }
}
