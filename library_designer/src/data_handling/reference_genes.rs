//! Reference gene sets used to pick screen genes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::errors::{DesignError, DesignResult};
use crate::helper_functions::Table;
use crate::models::Dataset;

const AVERAGE_COLUMN: &str = "__sample_average";

/// Whitespace-delimited text; the first token of each line is the symbol.
pub struct EssentialGenes {
    pub path: PathBuf,
}

impl Dataset for EssentialGenes {
    type Record = String;

    fn load(&self) -> DesignResult<Vec<String>> {
        info!("Reading essential genes from {}", self.path.display());
        let reader = BufReader::new(File::open(&self.path)?);

        let mut genes = Vec::new();
        for line in reader.lines() {
            if let Some(symbol) = line?.split_whitespace().next() {
                genes.push(symbol.to_string());
            }
        }
        Ok(genes)
    }
}

/// One column of a CSV or spreadsheet listing non-essential genes.
pub struct NonEssentialGenes {
    pub path: PathBuf,
    pub column: String,
}

impl Dataset for NonEssentialGenes {
    type Record = String;

    fn load(&self) -> DesignResult<Vec<String>> {
        let table = Table::read(&self.path)?;
        table.require(&[self.column.as_str()])?;
        Ok(table.strings(&self.column)?.into_iter().flatten().collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneExpression {
    pub gene: String,
    /// Mean over samples after scaling each sample by its maximum.
    pub level: f64,
}

pub struct ExpressionTable {
    pub path: PathBuf,
    pub gene_column: String,
    pub sample_columns: Vec<String>,
}

impl Dataset for ExpressionTable {
    type Record = GeneExpression;

    fn load(&self) -> DesignResult<Vec<GeneExpression>> {
        let table = Table::read(&self.path)?;
        let mut required = vec![self.gene_column.as_str()];
        required.extend(self.sample_columns.iter().map(String::as_str));
        table.require(&required)?;

        let scaled: Vec<Expr> = self
            .sample_columns
            .iter()
            .map(|name| {
                let values = col(name.as_str()).cast(DataType::Float64);
                (values.clone() / values.max()).alias(name.as_str())
            })
            .collect();
        let n_samples = self.sample_columns.len() as f64;
        let average = self
            .sample_columns
            .iter()
            .map(|name| col(name.as_str()))
            .reduce(|acc, e| acc + e)
            .ok_or_else(|| DesignError::invalid(&table.source, "no expression sample columns configured"))?
            / lit(n_samples);

        let frame = table
            .frame
            .lazy()
            .with_columns(scaled)
            .with_column(average.alias(AVERAGE_COLUMN))
            .collect()?;
        let averaged = Table::new(self.path.display().to_string(), frame);

        let genes = averaged.strings(&self.gene_column)?;
        let levels = averaged.floats(AVERAGE_COLUMN)?;
        Ok(genes
            .into_iter()
            .zip(levels)
            .filter_map(|(gene, level)| {
                Some(GeneExpression {
                    gene: gene?,
                    level: level?,
                })
            })
            .collect())
    }
}
