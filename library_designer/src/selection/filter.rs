use tracing::info;

use crate::config::LibraryConfig;
use crate::models::Candidate;

/// True when the candidate is scorable and clears both quality floors.
///
/// NaN values never pass a comparison, so unscored rows fall out here too.
pub fn passes_filter(candidate: &Candidate, config: &LibraryConfig) -> bool {
    candidate.secondary_specificity.is_some()
        && candidate.cutting_efficiency > config.min_cutting_efficiency
        && candidate.specificity > config.min_specificity
}

pub fn filter_candidates(
    candidates: Vec<Candidate>,
    config: &LibraryConfig,
    verbose: bool,
) -> Vec<Candidate> {
    let total = candidates.len();

    let scorable: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.secondary_specificity.is_some())
        .collect();
    let efficient: Vec<Candidate> = scorable
        .into_iter()
        .filter(|c| c.cutting_efficiency > config.min_cutting_efficiency)
        .collect();
    let efficient_len = efficient.len();
    let kept: Vec<Candidate> = efficient
        .into_iter()
        .filter(|c| passes_filter(c, config))
        .collect();

    if verbose {
        info!(
            "Filter: {} candidates in, {} after cutting efficiency (> {}), {} after specificity (> {})",
            total,
            efficient_len,
            config.min_cutting_efficiency,
            kept.len(),
            config.min_specificity
        );
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocusType;

    fn candidate(spec: f64, secondary: Option<f64>, eff: f64) -> Candidate {
        Candidate::new("G1", "ACGTACGTACGTACGTACGT", spec, secondary, eff, LocusType::Cds)
    }

    #[test]
    fn drops_each_failing_predicate() {
        let config = LibraryConfig::default();
        let input = vec![
            candidate(0.9, Some(0.8), 0.5),  // kept
            candidate(0.9, None, 0.5),       // not scorable
            candidate(0.9, Some(0.8), 0.25), // efficiency at threshold
            candidate(0.2, Some(0.8), 0.5),  // specificity at threshold
            candidate(0.21, Some(0.1), 0.26),
            candidate(f64::NAN, Some(0.8), 0.5),
        ];

        let kept = filter_candidates(input.clone(), &config, false);
        assert_eq!(kept.len(), 2);
        assert!(kept.len() <= input.len());
        for c in &kept {
            assert!(c.secondary_specificity.is_some());
            assert!(c.cutting_efficiency > 0.25);
            assert!(c.specificity > 0.20);
        }
    }

    #[test]
    fn empty_input() {
        assert!(filter_candidates(Vec::new(), &LibraryConfig::default(), true).is_empty());
    }
}
