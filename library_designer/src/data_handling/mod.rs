//! One adapter per upstream source. Format quirks stop here.

pub mod guidescan;
pub mod library_table;
pub mod non_targeting;
pub mod reference_genes;
pub mod safe_targeting;
pub mod state_of_the_art;

use crate::errors::DesignResult;
use crate::helper_functions::Table;
use crate::models::{OffTargetCounts, OFF_TARGET_DISTANCES};

/// Column holding the off-target count at mismatch distance `d` in library tables.
pub fn off_target_column(distance: usize) -> String {
    format!("{distance} Off-Targets")
}

/// Per-row off-target buckets; absent columns or cells stay `None`.
pub fn read_off_targets(table: &Table) -> DesignResult<Vec<OffTargetCounts>> {
    let mut counts = vec![OffTargetCounts::default(); table.height()];
    for distance in 0..OFF_TARGET_DISTANCES {
        let values = table.optional_floats(&off_target_column(distance))?;
        for (row, value) in counts.iter_mut().zip(values) {
            row.0[distance] = value.map(|v| v.round().max(0.0) as u32);
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn off_target_buckets_from_present_columns() {
        let df = df![
            "sgRNA" => ["AAAA", "CCCC"],
            "0 Off-Targets" => [Some(1i64), None],
            "2 Off-Targets" => [Some(4.0f64), Some(0.0)],
        ]
        .unwrap();
        let table = Table::new("in-memory", df);

        let counts = read_off_targets(&table).unwrap();
        assert_eq!(counts[0], OffTargetCounts([Some(1), None, Some(4), None]));
        assert_eq!(counts[1], OffTargetCounts([None, None, Some(0), None]));
    }
}
