//! Non-essential genes are there to measure background, so their guides are
//! chosen to carry as little real phenotype as possible.
//!
//! ```text
//! off-target library   rank genes by mean of the 2 largest off-target totals, desc
//! other libraries      rank (library, gene) by mean of the 2 lowest specificities, asc
//! reference library    every guide for any gene chosen above
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::info;

use crate::config::ScreenConfig;
use crate::models::{LibraryGuide, ScreenRole};

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the two largest (`largest = true`) or two smallest values.
fn mean_of_extreme_pair(mut values: Vec<f64>, largest: bool) -> f64 {
    values.sort_by(|a, b| if largest { b.total_cmp(a) } else { a.total_cmp(b) });
    values.truncate(2);
    mean(&values)
}

/// Genes of the off-target library with the heaviest off-target load.
pub fn off_target_heavy_genes(guides: &[&LibraryGuide], library: &str, n: usize) -> BTreeSet<String> {
    let mut totals: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for guide in guides.iter().filter(|g| g.library.as_deref() == Some(library)) {
        if let Some(gene) = &guide.gene {
            totals.entry(gene.as_str()).or_default().push(guide.off_targets.total() as f64);
        }
    }

    let mut ranked: Vec<(&str, f64)> = totals
        .into_iter()
        .map(|(gene, values)| (gene, mean_of_extreme_pair(values, true)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(gene, _)| gene.to_string()).collect()
}

/// `(library, gene)` pairs with the least specific guides, ranked across all
/// libraries not in `excluded`.
pub fn least_specific_pairs(
    guides: &[&LibraryGuide],
    excluded: &[&str],
    n: usize,
) -> Vec<(String, String)> {
    let mut specificities: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for guide in guides {
        let (Some(library), Some(gene), Some(specificity)) =
            (&guide.library, &guide.gene, guide.specificity)
        else {
            continue;
        };
        if excluded.contains(&library.as_str()) {
            continue;
        }
        specificities
            .entry((library.as_str(), gene.as_str()))
            .or_default()
            .push(specificity);
    }

    let mut ranked: Vec<((&str, &str), f64)> = specificities
        .into_iter()
        .map(|(key, values)| (key, mean_of_extreme_pair(values, false)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
        .into_iter()
        .take(n)
        .map(|((library, gene), _)| (library.to_string(), gene.to_string()))
        .collect()
}

pub fn select_non_essential_guides(
    guides: &[LibraryGuide],
    non_essential: &BTreeSet<String>,
    config: &ScreenConfig,
    verbose: bool,
) -> Vec<LibraryGuide> {
    let candidates: Vec<&LibraryGuide> = guides
        .iter()
        .filter(|g| g.gene.as_ref().is_some_and(|gene| non_essential.contains(gene)))
        .collect();

    let heavy_genes =
        off_target_heavy_genes(&candidates, &config.off_target_library, config.num_non_essential);
    let pairs = least_specific_pairs(
        &candidates,
        &[config.off_target_library.as_str(), config.reference_library.as_str()],
        config.num_non_essential,
    );

    // inner join of the chosen pairs against the candidate rows; a pair with
    // no rows simply contributes nothing
    let mut rows_by_pair: HashMap<(&str, &str), Vec<&LibraryGuide>> = HashMap::new();
    for guide in candidates.iter().copied() {
        if let (Some(library), Some(gene)) = (&guide.library, &guide.gene) {
            rows_by_pair.entry((library.as_str(), gene.as_str())).or_default().push(guide);
        }
    }
    let mut selected: Vec<&LibraryGuide> = pairs
        .iter()
        .flat_map(|(library, gene)| {
            rows_by_pair
                .get(&(library.as_str(), gene.as_str()))
                .cloned()
                .unwrap_or_default()
        })
        .collect();

    selected.extend(candidates.iter().copied().filter(|g| {
        g.library.as_deref() == Some(config.off_target_library.as_str())
            && g.gene.as_ref().is_some_and(|gene| heavy_genes.contains(gene))
    }));

    let chosen_genes: HashSet<&str> = selected.iter().filter_map(|g| g.gene.as_deref()).collect();
    let reference: Vec<&LibraryGuide> = guides
        .iter()
        .filter(|g| {
            g.library.as_deref() == Some(config.reference_library.as_str())
                && g.gene.as_deref().is_some_and(|gene| chosen_genes.contains(gene))
        })
        .collect();

    if verbose {
        info!(
            "Non-essential: {} heavy off-target genes in {}, {} least specific (library, gene) pairs, {} {} guides",
            heavy_genes.len(),
            config.off_target_library,
            pairs.len(),
            reference.len(),
            config.reference_library
        );
    }

    selected
        .into_iter()
        .chain(reference)
        .cloned()
        .map(|g| g.with_role(ScreenRole::NonEssentialGeneTargeting))
        .collect()
}
