use std::collections::BTreeMap;

use tracing::info;

use crate::config::LibraryConfig;
use crate::models::{Candidate, LocusType, RankResult, RankedCandidate, RejectionReason};

/// Whether any base repeats `k` or more times in a row.
///
/// Stops at the first qualifying run.
pub fn contains_homopolymer(sequence: &str, k: usize) -> bool {
    let bytes = sequence.as_bytes();
    if k <= 1 {
        return !bytes.is_empty();
    }

    let mut run = 1;
    for pair in bytes.windows(2) {
        if pair[1].eq_ignore_ascii_case(&pair[0]) {
            run += 1;
            if run >= k {
                return true;
            }
        } else {
            run = 1;
        }
    }
    false
}

/// Score a candidate, or say why it should only be picked as a last resort.
///
/// Checks run in a fixed order (exon, G/C, homopolymer) so each candidate
/// gets exactly one rejection reason.
pub fn rank_candidate(candidate: &Candidate, config: &LibraryConfig) -> RankResult {
    if candidate.locus_type == LocusType::Exon {
        return RankResult::Rejected(RejectionReason::ExonOverlap);
    }

    let gc = candidate.gc_content();
    if gc < config.min_gc_content || gc > config.max_gc_content {
        return RankResult::Rejected(RejectionReason::ExtremeGc);
    }

    if contains_homopolymer(&candidate.sequence, config.homopolymer_length) {
        return RankResult::Rejected(RejectionReason::Homopolymer);
    }

    RankResult::Accepted(
        candidate
            .min_specificity()
            .min(config.efficiency_weight * candidate.cutting_efficiency),
    )
}

pub fn rank_candidates(
    candidates: Vec<Candidate>,
    config: &LibraryConfig,
    verbose: bool,
) -> Vec<RankedCandidate> {
    let ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let rank = rank_candidate(&candidate, config);
            RankedCandidate { candidate, rank }
        })
        .collect();

    if verbose {
        let mut rejected: BTreeMap<RejectionReason, usize> = BTreeMap::new();
        for r in &ranked {
            if let RankResult::Rejected(reason) = r.rank {
                *rejected.entry(reason).or_default() += 1;
            }
        }
        let accepted = ranked.iter().filter(|r| r.rank.is_accepted()).count();
        info!("Rank: {} of {} candidates scored", accepted, ranked.len());
        for (reason, count) in rejected {
            info!("Rank: {:>7} deprioritised for {} (code {})", count, reason, reason.code());
        }
    }

    ranked
}
