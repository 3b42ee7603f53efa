use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::data_handling::reference_genes::GeneExpression;
use crate::errors::DesignResult;
use crate::models::LibraryGuide;
use crate::screen::sample_without_replacement;

/// Genes targeted by every library that targets any gene at all.
pub fn common_genes(guides: &[LibraryGuide]) -> BTreeSet<String> {
    let mut per_library: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for guide in guides {
        if let (Some(library), Some(gene)) = (&guide.library, &guide.gene) {
            per_library.entry(library.as_str()).or_default().insert(gene.as_str());
        }
    }

    let mut sets = per_library.into_values();
    let Some(first) = sets.next() else {
        return BTreeSet::new();
    };
    sets.fold(first, |acc, set| acc.intersection(&set).copied().collect())
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The `threshold` most expressed common genes. Equal levels keep table order.
pub fn expressed_genes(
    mut expression: Vec<GeneExpression>,
    common: &BTreeSet<String>,
    threshold: usize,
) -> BTreeSet<String> {
    expression.retain(|e| common.contains(&e.gene));
    expression.sort_by(|a, b| b.level.total_cmp(&a.level));
    expression.into_iter().take(threshold).map(|e| e.gene).collect()
}

/// Sample `n` of the expressed essential genes. Candidates are sorted first so
/// the draw only depends on the generator state.
pub fn essential_genes<R: Rng + ?Sized>(
    essential: Vec<String>,
    expressed: &BTreeSet<String>,
    n: usize,
    rng: &mut R,
) -> DesignResult<BTreeSet<String>> {
    let candidates: Vec<String> = essential
        .into_iter()
        .filter(|g| expressed.contains(g))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    Ok(sample_without_replacement(&candidates, n, rng, "essential genes")?
        .into_iter()
        .collect())
}

/// Non-essential genes that are not expressed but targeted by every library.
pub fn non_essential_genes(
    non_essential: Vec<String>,
    expressed: &BTreeSet<String>,
    common: &BTreeSet<String>,
) -> BTreeSet<String> {
    non_essential
        .into_iter()
        .filter(|g| !expressed.contains(g) && common.contains(g))
        .collect()
}
