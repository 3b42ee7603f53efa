use std::collections::BTreeMap;

use tracing::info;

use crate::models::RankedCandidate;

/// Per gene, the `k` best candidates in descending rank order.
///
/// The sort is stable, so equal ranks keep their input order. Genes with fewer
/// than `k` candidates keep all of them.
pub fn select_top_k(
    ranked: Vec<RankedCandidate>,
    k: usize,
    verbose: bool,
) -> BTreeMap<String, Vec<RankedCandidate>> {
    let mut by_gene: BTreeMap<String, Vec<RankedCandidate>> = BTreeMap::new();
    for r in ranked {
        by_gene.entry(r.candidate.gene.clone()).or_default().push(r);
    }

    for guides in by_gene.values_mut() {
        guides.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        guides.truncate(k);
    }

    if verbose {
        let short = under_filled_genes(&by_gene, k);
        let selected: usize = by_gene.values().map(Vec::len).sum();
        info!("Select: {} guides across {} genes (k = {})", selected, by_gene.len(), k);
        if !short.is_empty() {
            info!("Select: {} genes have fewer than {} guides: {:?}", short.len(), k, short);
        }
    }

    by_gene
}

pub fn under_filled_genes(selection: &BTreeMap<String, Vec<RankedCandidate>>, k: usize) -> Vec<String> {
    selection
        .iter()
        .filter(|(_, guides)| guides.len() < k)
        .map(|(gene, _)| gene.clone())
        .collect()
}
