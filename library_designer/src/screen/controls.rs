use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use tracing::info;

use crate::data_handling::safe_targeting::most_specific;
use crate::errors::DesignResult;
use crate::models::{ControlKind, LibraryGuide};
use crate::screen::sample_without_replacement;

/// Two control sub-seeds drawn from the master generator.
pub fn sub_seeds<R: Rng + ?Sized>(rng: &mut R, max: u64) -> (u64, u64) {
    (rng.random_range(0..=max), rng.random_range(0..=max))
}

/// `n` non-targeting controls drawn with `seeds.0` and `n` safe-targeting
/// controls drawn with `seeds.1` from the `pool_size` most specific ones.
pub fn sample_controls(
    guides: &[LibraryGuide],
    seeds: (u64, u64),
    n: usize,
    pool_size: usize,
    verbose: bool,
) -> DesignResult<Vec<LibraryGuide>> {
    let non_targeting: Vec<LibraryGuide> = guides
        .iter()
        .filter(|g| g.is_control(ControlKind::NonTargeting))
        .cloned()
        .collect();
    let safe_targeting: Vec<LibraryGuide> = most_specific(
        guides
            .iter()
            .filter(|g| g.is_control(ControlKind::SafeTargeting))
            .cloned()
            .collect(),
        pool_size,
    );

    if verbose {
        info!(
            "Controls: pools of {} non-targeting and {} safe-targeting guides, seeds {:?}",
            non_targeting.len(),
            safe_targeting.len(),
            seeds
        );
    }

    let mut controls = sample_without_replacement(
        &non_targeting,
        n,
        &mut Isaac64Rng::seed_from_u64(seeds.0),
        "non-targeting controls",
    )?;
    controls.extend(sample_without_replacement(
        &safe_targeting,
        n,
        &mut Isaac64Rng::seed_from_u64(seeds.1),
        "safe-targeting controls",
    )?);
    Ok(controls)
}
