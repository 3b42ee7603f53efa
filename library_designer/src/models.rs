use std::cmp::Ordering;
use std::fmt;

use crate::errors::{DesignError, DesignResult};
use crate::helper_functions::gc_content;

/// A named upstream data source.
///
/// Each adapter owns the format quirks of its source (column names, prefixes,
/// trailing PAMs) and hands the pipelines clean records.
pub trait Dataset {
    type Record;

    fn load(&self) -> DesignResult<Vec<Self::Record>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Candidates
// ─────────────────────────────────────────────────────────────────────────────

/// Where a candidate guide cuts relative to its target gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocusType {
    Exon,
    Cds,
    Other(String),
}

impl LocusType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "exon" => LocusType::Exon,
            "CDS" => LocusType::Cds,
            other => LocusType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LocusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocusType::Exon => write!(f, "exon"),
            LocusType::Cds => write!(f, "CDS"),
            LocusType::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One guide-RNA-to-target-site association.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub gene: String,
    pub identifier: String,
    pub sequence: String,
    pub pam: String,
    pub specificity: f64,
    /// 5'-G primed specificity; `None` when the source could not score it.
    pub secondary_specificity: Option<f64>,
    pub cutting_efficiency: f64,
    pub locus_type: LocusType,
    gc_content: f64,
    pub chr: Option<String>,
    pub pos: Option<i64>,
    pub strand: Option<String>,
    pub region_id: Option<String>,
}

impl Candidate {
    pub fn new(
        gene: impl Into<String>,
        sequence: impl Into<String>,
        specificity: f64,
        secondary_specificity: Option<f64>,
        cutting_efficiency: f64,
        locus_type: LocusType,
    ) -> Self {
        let sequence = sequence.into();
        Self {
            gene: gene.into(),
            identifier: String::new(),
            gc_content: gc_content(&sequence),
            sequence,
            pam: String::new(),
            specificity,
            secondary_specificity,
            cutting_efficiency,
            locus_type,
            chr: None,
            pos: None,
            strand: None,
            region_id: None,
        }
    }

    /// Always derived from `sequence`; upstream G/C columns are ignored.
    pub fn gc_content(&self) -> f64 {
        self.gc_content
    }

    pub fn min_specificity(&self) -> f64 {
        match self.secondary_specificity {
            Some(secondary) => self.specificity.min(secondary),
            None => self.specificity,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ranking
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectionReason {
    ExonOverlap,
    ExtremeGc,
    Homopolymer,
}

impl RejectionReason {
    /// Legacy numeric code used in diagnostics.
    pub fn code(self) -> i8 {
        match self {
            RejectionReason::ExonOverlap => -1,
            RejectionReason::ExtremeGc => -2,
            RejectionReason::Homopolymer => -3,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectionReason::ExonOverlap => "exon overlap",
            RejectionReason::ExtremeGc => "extreme G/C content",
            RejectionReason::Homopolymer => "homopolymer run",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankResult {
    Accepted(f64),
    Rejected(RejectionReason),
}

impl RankResult {
    /// Any rejection orders below any accepted score; rejections tie with each
    /// other and accepted scores order by value.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RankResult::Accepted(a), RankResult::Accepted(b)) => a.total_cmp(b),
            (RankResult::Accepted(_), RankResult::Rejected(_)) => Ordering::Greater,
            (RankResult::Rejected(_), RankResult::Accepted(_)) => Ordering::Less,
            (RankResult::Rejected(_), RankResult::Rejected(_)) => Ordering::Equal,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            RankResult::Accepted(score) => Some(*score),
            RankResult::Rejected(_) => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, RankResult::Accepted(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub rank: RankResult,
}

// ─────────────────────────────────────────────────────────────────────────────
// Library rows
// ─────────────────────────────────────────────────────────────────────────────

/// Mismatch distances 0..=3 carry off-target annotations.
pub const OFF_TARGET_DISTANCES: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffTargetCounts(pub [Option<u32>; OFF_TARGET_DISTANCES]);

impl OffTargetCounts {
    pub fn zero() -> Self {
        OffTargetCounts([Some(0); OFF_TARGET_DISTANCES])
    }

    /// Sum over all annotated buckets; missing buckets count as zero.
    pub fn total(&self) -> u32 {
        self.0.iter().flatten().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    NonTargeting,
    SafeTargeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideKind {
    GeneTargeting,
    Control(ControlKind),
    EssentialGeneTargeting,
    NonEssentialGeneTargeting,
}

impl GuideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideKind::GeneTargeting => "gene_targeting",
            GuideKind::Control(ControlKind::NonTargeting) => "non_targeting_control",
            GuideKind::Control(ControlKind::SafeTargeting) => "safe_targeting_control",
            GuideKind::EssentialGeneTargeting => "essential_gene_targeting",
            GuideKind::NonEssentialGeneTargeting => "non_essential_gene_targeting",
        }
    }

    pub fn parse(source_name: &str, raw: &str) -> DesignResult<Self> {
        match raw {
            "gene_targeting" => Ok(GuideKind::GeneTargeting),
            "non_targeting_control" => Ok(GuideKind::Control(ControlKind::NonTargeting)),
            "safe_targeting_control" => Ok(GuideKind::Control(ControlKind::SafeTargeting)),
            "essential_gene_targeting" => Ok(GuideKind::EssentialGeneTargeting),
            "non_essential_gene_targeting" => Ok(GuideKind::NonEssentialGeneTargeting),
            other => Err(DesignError::invalid(source_name, format!("unknown guide type `{other}`"))),
        }
    }
}

/// The part a guide plays in the final screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenRole {
    EssentialGeneTargeting,
    NonEssentialGeneTargeting,
    Control,
}

/// One row of a guide library or of the final screen.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryGuide {
    pub library: Option<String>,
    pub gene: Option<String>,
    pub identifier: Option<String>,
    pub sgrna: String,
    pub pam: Option<String>,
    pub strand: Option<String>,
    pub chr: Option<String>,
    pub pos: Option<i64>,
    pub specificity: Option<f64>,
    pub secondary_specificity: Option<f64>,
    pub cutting_efficiency: Option<f64>,
    pub gc_content: f64,
    pub cuts_in: Option<String>,
    pub cutting_region_id: Option<String>,
    pub safe_targeting_region: Option<String>,
    pub off_targets: OffTargetCounts,
    pub kind: GuideKind,
}

impl LibraryGuide {
    /// A bare row carrying only a sequence; adapters fill in the rest.
    pub fn new(sgrna: impl Into<String>, kind: GuideKind) -> Self {
        let sgrna = sgrna.into();
        Self {
            library: None,
            gene: None,
            identifier: None,
            gc_content: gc_content(&sgrna),
            sgrna,
            pam: None,
            strand: None,
            chr: None,
            pos: None,
            specificity: None,
            secondary_specificity: None,
            cutting_efficiency: None,
            cuts_in: None,
            cutting_region_id: None,
            safe_targeting_region: None,
            off_targets: OffTargetCounts::default(),
            kind,
        }
    }

    pub fn refresh_gc_content(&mut self) {
        self.gc_content = gc_content(&self.sgrna);
    }

    pub fn is_control(&self, kind: ControlKind) -> bool {
        self.kind == GuideKind::Control(kind)
    }

    /// Tag the row for the screen. Controls keep their control type.
    pub fn with_role(mut self, role: ScreenRole) -> Self {
        match role {
            ScreenRole::EssentialGeneTargeting => self.kind = GuideKind::EssentialGeneTargeting,
            ScreenRole::NonEssentialGeneTargeting => {
                self.kind = GuideKind::NonEssentialGeneTargeting
            }
            ScreenRole::Control => {}
        }
        self
    }
}

impl From<RankedCandidate> for LibraryGuide {
    fn from(ranked: RankedCandidate) -> Self {
        let c = ranked.candidate;
        LibraryGuide {
            library: None,
            gene: Some(c.gene),
            identifier: Some(c.identifier),
            gc_content: c.gc_content,
            sgrna: c.sequence,
            pam: Some(c.pam),
            strand: c.strand,
            chr: c.chr,
            pos: c.pos,
            specificity: Some(c.specificity),
            secondary_specificity: c.secondary_specificity,
            cutting_efficiency: Some(c.cutting_efficiency),
            cuts_in: Some(c.locus_type.to_string()),
            cutting_region_id: c.region_id,
            safe_targeting_region: None,
            off_targets: OffTargetCounts::default(),
            kind: GuideKind::GeneTargeting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_sort_below_any_score() {
        let low = RankResult::Accepted(0.0);
        let exon = RankResult::Rejected(RejectionReason::ExonOverlap);
        let homo = RankResult::Rejected(RejectionReason::Homopolymer);

        assert_eq!(low.total_cmp(&exon), Ordering::Greater);
        assert_eq!(homo.total_cmp(&low), Ordering::Less);
        assert_eq!(exon.total_cmp(&homo), Ordering::Equal);
        assert_eq!(RankResult::Accepted(0.4).total_cmp(&RankResult::Accepted(0.9)), Ordering::Less);
    }

    #[test]
    fn gc_content_is_derived_from_sequence() {
        let c = Candidate::new("G1", "GGCCAATT", 0.9, None, 0.5, LocusType::Cds);
        assert!((c.gc_content() - 0.5).abs() < 1e-12);
        assert_eq!(c.min_specificity(), 0.9);
    }

    #[test]
    fn controls_keep_their_type_when_tagged() {
        let control = LibraryGuide::new("ACGT", GuideKind::Control(ControlKind::SafeTargeting))
            .with_role(ScreenRole::Control);
        assert_eq!(control.kind.as_str(), "safe_targeting_control");

        let essential = LibraryGuide::new("ACGT", GuideKind::GeneTargeting)
            .with_role(ScreenRole::EssentialGeneTargeting);
        assert_eq!(essential.kind.as_str(), "essential_gene_targeting");
    }

    #[test]
    fn off_target_total_skips_missing_buckets() {
        let counts = OffTargetCounts([Some(1), None, Some(3), Some(2)]);
        assert_eq!(counts.total(), 6);
        assert_eq!(OffTargetCounts::default().total(), 0);
    }
}
