use polars::prelude::*;

use crate::data_handling::off_target_column;
use crate::errors::DesignResult;
use crate::models::{LibraryGuide, OFF_TARGET_DISTANCES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `design-library`: no library column, `d Off-Targets` columns.
    Library,
    /// `design-screen`: leading `Library` column, `Distance d Matches` columns.
    Screen,
}

impl OutputLayout {
    fn off_target_header(&self, distance: usize) -> String {
        match self {
            OutputLayout::Library => off_target_column(distance),
            OutputLayout::Screen => format!("Distance {distance} Matches"),
        }
    }
}

fn string_column<F>(name: &str, guides: &[LibraryGuide], f: F) -> Column
where
    F: Fn(&LibraryGuide) -> Option<String>,
{
    let values: Vec<Option<String>> = guides.iter().map(f).collect();
    Series::new(PlSmallStr::from(name), values).into()
}

fn float_column<F>(name: &str, guides: &[LibraryGuide], f: F) -> Column
where
    F: Fn(&LibraryGuide) -> Option<f64>,
{
    let values: Vec<Option<f64>> = guides.iter().map(f).collect();
    Series::new(PlSmallStr::from(name), values).into()
}

pub fn to_dataframe(guides: &[LibraryGuide], layout: OutputLayout) -> DesignResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::new();

    if layout == OutputLayout::Screen {
        columns.push(string_column("Library", guides, |g| g.library.clone()));
    }
    columns.push(string_column("Gene", guides, |g| g.gene.clone()));
    columns.push(string_column("Identifier", guides, |g| g.identifier.clone()));
    columns.push(string_column("sgRNA", guides, |g| Some(g.sgrna.clone())));
    columns.push(string_column("PAM", guides, |g| g.pam.clone()));
    columns.push(string_column("Strand", guides, |g| g.strand.clone()));
    columns.push(string_column("Chr", guides, |g| g.chr.clone()));
    let pos: Vec<Option<i64>> = guides.iter().map(|g| g.pos).collect();
    columns.push(Series::new(PlSmallStr::from("Pos"), pos).into());
    columns.push(float_column("Specificity", guides, |g| g.specificity));
    columns.push(float_column("5pG Specificity", guides, |g| g.secondary_specificity));
    columns.push(float_column("Cutting Efficiency", guides, |g| g.cutting_efficiency));
    columns.push(float_column("G/C Content", guides, |g| Some(g.gc_content)));
    columns.push(string_column("Cuts In", guides, |g| g.cuts_in.clone()));
    columns.push(string_column("Cutting Region ID", guides, |g| g.cutting_region_id.clone()));
    columns.push(string_column("Safe Targeting Region", guides, |g| g.safe_targeting_region.clone()));
    columns.push(string_column("Type", guides, |g| Some(g.kind.as_str().to_string())));

    for distance in 0..OFF_TARGET_DISTANCES {
        let counts: Vec<Option<u32>> = guides.iter().map(|g| g.off_targets.0[distance]).collect();
        columns.push(Series::new(PlSmallStr::from(layout.off_target_header(distance)), counts).into());
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ControlKind, GuideKind, OffTargetCounts};

    #[test]
    fn screen_layout_headers() {
        let mut guide = LibraryGuide::new("ACGT", GuideKind::Control(ControlKind::NonTargeting));
        guide.library = Some("Guidescan".into());
        guide.off_targets = OffTargetCounts::zero();

        let df = to_dataframe(&[guide], OutputLayout::Screen).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(names[0], "Library");
        assert!(names.contains(&"Distance 3 Matches".to_string()));
        assert!(!names.contains(&"3 Off-Targets".to_string()));
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("Type").unwrap().str().unwrap().get(0), Some("non_targeting_control"));
        assert_eq!(df.column("G/C Content").unwrap().f64().unwrap().get(0), Some(0.5));
    }

    #[test]
    fn library_layout_headers() {
        let df = to_dataframe(&[], OutputLayout::Library).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(names[0], "Gene");
        assert!(names.contains(&"0 Off-Targets".to_string()));
        assert_eq!(df.height(), 0);
    }
}
