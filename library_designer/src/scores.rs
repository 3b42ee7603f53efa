//! Attach externally computed specificity scores to a guide table by `id`.

use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::errors::{DesignError, DesignResult};
use crate::helper_functions::{read_csv, read_csv_without_header};

/// Header-less `id,specificity` file as a two-column frame.
fn read_scores(path: &Path) -> DesignResult<DataFrame> {
    let mut df = read_csv_without_header(path)?;
    if df.width() < 2 {
        return Err(DesignError::invalid(
            &path.display().to_string(),
            "expected two columns: id, specificity",
        ));
    }
    let names: Vec<PlSmallStr> = df.get_column_names().into_iter().take(2).cloned().collect();
    df.rename(names[0].as_str(), PlSmallStr::from("id"))?;
    df.rename(names[1].as_str(), PlSmallStr::from("specificity"))?;

    let id = df.column("id")?.cast(&DataType::String)?;
    let specificity = df.column("specificity")?.cast(&DataType::Float64)?;
    Ok(DataFrame::new(vec![id, specificity])?)
}

/// Left join of both score files onto `input`; unscored rows get nulls.
pub fn attach_scores(scores1: &Path, scores2: &Path, input: &Path) -> DesignResult<DataFrame> {
    let mut scores = read_scores(scores1)?;
    scores.vstack_mut(&read_scores(scores2)?)?;
    info!("Read {} scores", scores.height());

    let mut library = read_csv(input)?;
    if !library.get_column_names().iter().any(|c| c.as_str() == "id") {
        return Err(DesignError::missing_column(&input.display().to_string(), "id"));
    }
    let id = library.column("id")?.cast(&DataType::String)?;
    library.with_column(id)?;

    let merged = library.join(
        &scores,
        ["id"],
        ["id"],
        JoinArgs::from(JoinType::Left),
        None,
    )?;
    info!("Attached scores to {} rows", merged.height());
    Ok(merged)
}
