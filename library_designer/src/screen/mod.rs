//! Screen composition: essential genes, non-essential genes and controls drawn
//! from several guide libraries into one balanced screen.

pub mod controls;
pub mod gene_sets;
pub mod non_essential;

use std::path::PathBuf;

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use tracing::info;

use crate::config::ScreenConfig;
use crate::data_handling::library_table::GuideLibraryTable;
use crate::data_handling::reference_genes::{
    EssentialGenes, ExpressionTable, GeneExpression, NonEssentialGenes,
};
use crate::data_handling::state_of_the_art::StateOfTheArtLibraries;
use crate::errors::{DesignError, DesignResult};
use crate::models::{Dataset, LibraryGuide, ScreenRole};

/// Draw `n` items without replacement, in draw order.
pub(crate) fn sample_without_replacement<T: Clone, R: Rng + ?Sized>(
    items: &[T],
    n: usize,
    rng: &mut R,
    what: &'static str,
) -> DesignResult<Vec<T>> {
    if n > items.len() {
        return Err(DesignError::SampleSize {
            what,
            requested: n,
            available: items.len(),
        });
    }
    Ok(index::sample(rng, items.len(), n)
        .into_iter()
        .map(|i| items[i].clone())
        .collect())
}

pub struct ScreenInputs {
    pub library_csv: PathBuf,
    pub state_of_the_art_csv: PathBuf,
    pub gene_expression_csv: PathBuf,
    pub essential_genes_txt: PathBuf,
    pub non_essential_genes_csv: PathBuf,
}

/// Everything the composition needs, already loaded.
pub struct ScreenSources {
    pub guides: Vec<LibraryGuide>,
    pub expression: Vec<GeneExpression>,
    pub essential: Vec<String>,
    pub non_essential: Vec<String>,
}

impl ScreenSources {
    pub fn load(inputs: &ScreenInputs, config: &ScreenConfig) -> DesignResult<Self> {
        let mut guides = GuideLibraryTable {
            path: inputs.library_csv.clone(),
            library: config.reference_library.clone(),
        }
        .load()?;
        guides.extend(
            StateOfTheArtLibraries {
                path: inputs.state_of_the_art_csv.clone(),
                renames: config.library_renames.clone(),
            }
            .load()?,
        );

        let expression = ExpressionTable {
            path: inputs.gene_expression_csv.clone(),
            gene_column: config.expression_gene_column.clone(),
            sample_columns: config.expression_columns.clone(),
        }
        .load()?;
        let essential = EssentialGenes {
            path: inputs.essential_genes_txt.clone(),
        }
        .load()?;
        let non_essential = NonEssentialGenes {
            path: inputs.non_essential_genes_csv.clone(),
            column: config.non_essential_column.clone(),
        }
        .load()?;

        Ok(Self {
            guides,
            expression,
            essential,
            non_essential,
        })
    }
}

/// Essential guides, then non-essential guides, then controls.
///
/// All randomness comes from one generator seeded with `config.seed`: the
/// essential-gene draw first, then the two control sub-seeds.
pub fn compose_screen(
    sources: ScreenSources,
    config: &ScreenConfig,
    verbose: bool,
) -> DesignResult<Vec<LibraryGuide>> {
    let mut rng = Isaac64Rng::seed_from_u64(config.seed);
    let ScreenSources {
        guides,
        expression,
        essential,
        non_essential,
    } = sources;

    let common = gene_sets::common_genes(&guides);
    let expressed = gene_sets::expressed_genes(expression, &common, config.expression_threshold);
    let essential = gene_sets::essential_genes(essential, &expressed, config.num_essential, &mut rng)?;
    let non_essential = gene_sets::non_essential_genes(non_essential, &expressed, &common);

    if verbose {
        info!(
            "Gene sets: {} common, {} expressed, {} essential, {} non-essential",
            common.len(),
            expressed.len(),
            essential.len(),
            non_essential.len()
        );
    }

    let mut screen: Vec<LibraryGuide> = guides
        .iter()
        .filter(|g| g.gene.as_ref().is_some_and(|gene| essential.contains(gene)))
        .cloned()
        .map(|g| g.with_role(ScreenRole::EssentialGeneTargeting))
        .collect();
    let n_essential = screen.len();

    screen.extend(non_essential::select_non_essential_guides(
        &guides,
        &non_essential,
        config,
        verbose,
    ));
    let n_non_essential = screen.len() - n_essential;

    let seeds = controls::sub_seeds(&mut rng, config.sub_seed_max);
    screen.extend(
        controls::sample_controls(
            &guides,
            seeds,
            config.num_controls,
            config.safe_targeting_pool,
            verbose,
        )?
        .into_iter()
        .map(|g| g.with_role(ScreenRole::Control)),
    );

    for guide in &mut screen {
        guide.refresh_gc_content();
    }

    info!(
        "Screen: {} essential, {} non-essential and {} control guides",
        n_essential,
        n_non_essential,
        screen.len() - n_essential - n_non_essential
    );
    Ok(screen)
}

pub fn design_screen(
    inputs: &ScreenInputs,
    config: &ScreenConfig,
    verbose: bool,
) -> DesignResult<Vec<LibraryGuide>> {
    let sources = ScreenSources::load(inputs, config)?;
    compose_screen(sources, config, verbose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ControlKind, GuideKind};

    fn guide(library: &str, gene: &str, specificity: f64) -> LibraryGuide {
        let mut g = LibraryGuide::new(format!("{library}{gene}{specificity}"), GuideKind::GeneTargeting);
        g.library = Some(library.into());
        g.gene = Some(gene.into());
        g.specificity = Some(specificity);
        g
    }

    fn sources() -> ScreenSources {
        let mut guides = Vec::new();
        for gene in ["E1", "E2", "E3", "N1", "N2", "X"] {
            guides.push(guide("Guidescan", gene, 0.9));
            guides.push(guide("Moffat2015", gene, 0.3));
            guides.push(guide("Bassik2017", gene, 0.4));
        }
        for i in 0..4 {
            let mut nt = LibraryGuide::new(format!("NT{i}"), GuideKind::Control(ControlKind::NonTargeting));
            nt.library = Some("Guidescan".into());
            guides.push(nt);
            let mut st = LibraryGuide::new(format!("ST{i}"), GuideKind::Control(ControlKind::SafeTargeting));
            st.library = Some("Guidescan".into());
            st.specificity = Some(0.5 + i as f64 / 10.0);
            guides.push(st);
        }

        let expression = ["E1", "E2", "E3", "X", "N1", "N2"]
            .iter()
            .enumerate()
            .map(|(i, g)| GeneExpression { gene: g.to_string(), level: 1.0 - i as f64 / 10.0 })
            .collect();

        ScreenSources {
            guides,
            expression,
            essential: vec!["E1".into(), "E2".into(), "E3".into(), "Q".into()],
            non_essential: vec!["N1".into(), "N2".into(), "E1".into()],
        }
    }

    fn config() -> ScreenConfig {
        ScreenConfig {
            num_essential: 2,
            num_non_essential: 1,
            num_controls: 2,
            expression_threshold: 4,
            safe_targeting_pool: 3,
            ..ScreenConfig::default()
        }
    }

    #[test]
    fn composes_balanced_screen() {
        let screen = compose_screen(sources(), &config(), true).unwrap();

        let essential: Vec<&LibraryGuide> = screen
            .iter()
            .filter(|g| g.kind == GuideKind::EssentialGeneTargeting)
            .collect();
        // two essential genes, three libraries each
        assert_eq!(essential.len(), 6);
        assert!(essential.iter().all(|g| ["E1", "E2", "E3"].contains(&g.gene.as_deref().unwrap())));

        let non_essential: Vec<&LibraryGuide> = screen
            .iter()
            .filter(|g| g.kind == GuideKind::NonEssentialGeneTargeting)
            .collect();
        assert!(!non_essential.is_empty());
        assert!(non_essential.iter().all(|g| ["N1", "N2"].contains(&g.gene.as_deref().unwrap())));

        let controls = screen
            .iter()
            .filter(|g| matches!(g.kind, GuideKind::Control(_)))
            .count();
        assert_eq!(controls, 4);
        assert!(screen
            .iter()
            .filter(|g| g.is_control(ControlKind::SafeTargeting))
            .all(|g| g.specificity.unwrap() > 0.55));
    }

    #[test]
    fn identical_seed_identical_screen() {
        let first = compose_screen(sources(), &config(), false).unwrap();
        let second = compose_screen(sources(), &config(), false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn too_few_essential_genes_is_fatal() {
        let config = ScreenConfig {
            num_essential: 10,
            ..config()
        };
        let err = compose_screen(sources(), &config, false).unwrap_err();
        assert!(matches!(err, DesignError::SampleSize { .. }));
    }
}
