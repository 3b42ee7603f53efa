use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::errors::{DesignError, DesignResult};

/// Fraction of G/C bases in a guide sequence.
pub fn gc_content(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let gc = sequence
        .bytes()
        .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C'))
        .count();
    gc as f64 / sequence.len() as f64
}

/// Drop `n` leading characters (upstream identifiers carry a fixed prefix).
pub fn strip_prefix_chars(s: &str, n: usize) -> String {
    s.chars().skip(n).collect()
}

/// Drop `n` trailing characters (upstream sequences carry their PAM).
pub fn strip_suffix_chars(s: &str, n: usize) -> String {
    let keep = s.chars().count().saturating_sub(n);
    s.chars().take(keep).collect()
}

pub fn read_csv(file_path: &Path) -> DesignResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))
        .and_then(|reader| reader.finish())
        .map_err(|source| DesignError::Read {
            path: file_path.display().to_string(),
            source,
        })
}

pub fn read_csv_without_header(file_path: &Path) -> DesignResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))
        .and_then(|reader| reader.finish())
        .map_err(|source| DesignError::Read {
            path: file_path.display().to_string(),
            source,
        })
}

// ─── read_excel ──────────────────────────────────────────────────────────────

fn cell_to_string(cell: &calamine::DataType) -> String {
    use calamine::DataType as Ct;
    match cell {
        Ct::String(s) => s.clone(),
        Ct::Empty => String::new(),
        Ct::Bool(b) => b.to_string(),
        Ct::Error(e) => format!("ERR({e:?})"),
        Ct::Float(n) | Ct::Duration(n) => n.to_string(),
        Ct::Int(i) => i.to_string(),
        Ct::DateTime(f) => f.to_string(),
        Ct::DateTimeIso(s) | Ct::DurationIso(s) => s.clone(),
    }
}

/// First worksheet as all-string columns; callers cast what they need.
fn read_excel(path: &Path) -> DesignResult<DataFrame> {
    use calamine::{open_workbook_auto, Reader};

    let workbook_err = |message: String| DesignError::Workbook {
        path: path.display().to_string(),
        message,
    };

    let mut wb = open_workbook_auto(path).map_err(|e| workbook_err(e.to_string()))?;
    let range = wb
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_err("workbook has no worksheets".to_string()))?
        .map_err(|e| workbook_err(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| workbook_err("empty sheet".to_string()))?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!("Workbook header = {:?}", headers);

    let mut cols: Vec<Vec<Option<String>>> =
        vec![Vec::with_capacity(range.height()); headers.len()];
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(headers.len()) {
            cols[i].push(match cell {
                calamine::DataType::Empty => None,
                _ => Some(cell_to_string(cell)),
            });
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cols)
        .map(|(h, c)| Series::new(PlSmallStr::from(h), c).into())
        .collect();

    Ok(DataFrame::new(columns)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Table
// ─────────────────────────────────────────────────────────────────────────────

/// A loaded input file plus the name used in error messages.
pub struct Table {
    pub source: String,
    pub frame: DataFrame,
}

impl Table {
    pub fn new(source: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            source: source.into(),
            frame,
        }
    }

    /// CSV, or the first sheet of a spreadsheet when the extension says so.
    pub fn read(path: &Path) -> DesignResult<Self> {
        info!("Reading data from {}", path.display());
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xls" | "xlsm" | "ods"))
            .unwrap_or(false);

        let frame = if is_workbook {
            read_excel(path)?
        } else {
            read_csv(path)?
        };
        debug!("Loaded {} rows from {}", frame.height(), path.display());

        Ok(Self::new(path.display().to_string(), frame))
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_names().iter().any(|c| c.as_str() == name)
    }

    /// Fail with an input-schema error naming the first absent column.
    pub fn require(&self, columns: &[&str]) -> DesignResult<()> {
        match columns.iter().find(|c| !self.has_column(c)) {
            Some(missing) => Err(DesignError::missing_column(&self.source, missing)),
            None => Ok(()),
        }
    }

    fn cast_column(&self, name: &str, dtype: &DataType) -> DesignResult<Column> {
        let column = self
            .frame
            .column(name)
            .map_err(|_| DesignError::missing_column(&self.source, name))?;
        Ok(column.cast(dtype)?)
    }

    pub fn strings(&self, name: &str) -> DesignResult<Vec<Option<String>>> {
        let column = self.cast_column(name, &DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    pub fn optional_strings(&self, name: &str) -> DesignResult<Vec<Option<String>>> {
        if self.has_column(name) {
            self.strings(name)
        } else {
            Ok(vec![None; self.height()])
        }
    }

    /// Numeric column; NaN is reported as missing.
    pub fn floats(&self, name: &str) -> DesignResult<Vec<Option<f64>>> {
        let column = self.cast_column(name, &DataType::Float64)?;
        let values = column
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(values)
    }

    pub fn optional_floats(&self, name: &str) -> DesignResult<Vec<Option<f64>>> {
        if self.has_column(name) {
            self.floats(name)
        } else {
            Ok(vec![None; self.height()])
        }
    }

    pub fn integers(&self, name: &str) -> DesignResult<Vec<Option<i64>>> {
        Ok(self
            .floats(name)?
            .into_iter()
            .map(|v| v.map(|x| x.round() as i64))
            .collect())
    }

    pub fn optional_integers(&self, name: &str) -> DesignResult<Vec<Option<i64>>> {
        if self.has_column(name) {
            self.integers(name)
        } else {
            Ok(vec![None; self.height()])
        }
    }

    /// Truthy cells are `true`/`1` in any case; everything else is false.
    pub fn booleans(&self, name: &str) -> DesignResult<Vec<bool>> {
        Ok(self
            .strings(name)?
            .into_iter()
            .map(|v| {
                v.map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "1.0"))
                    .unwrap_or(false)
            })
            .collect())
    }
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> DesignResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn gc_content_counts_g_and_c() {
        assert_eq!(gc_content("GGGG"), 1.0);
        assert_eq!(gc_content("ACGT"), 0.5);
        assert_eq!(gc_content("aatt"), 0.0);
        assert_eq!(gc_content(""), 0.0);
    }

    #[test]
    fn prefix_and_suffix_stripping() {
        assert_eq!(strip_prefix_chars("gene:TP53", 5), "TP53");
        assert_eq!(strip_suffix_chars("ACGTACGTAGG", 3), "ACGTACGT");
        assert_eq!(strip_suffix_chars("AG", 3), "");
    }

    #[test]
    fn missing_column_is_named() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "gene,specificity\nA,0.5").unwrap();

        let table = Table::read(file.path()).unwrap();
        let err = table.require(&["gene", "cutting_efficiency"]).unwrap_err();
        assert!(err.to_string().contains("cutting_efficiency"));
    }

    #[test]
    fn typed_columns_from_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "flag,score,pos\nTrue,0.5,10\nFalse,,12").unwrap();

        let table = Table::read(file.path()).unwrap();
        assert_eq!(table.booleans("flag").unwrap(), vec![true, false]);
        assert_eq!(table.floats("score").unwrap(), vec![Some(0.5), None]);
        assert_eq!(table.integers("pos").unwrap(), vec![Some(10), Some(12)]);
        assert_eq!(table.optional_strings("absent").unwrap(), vec![None, None]);
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let err = Table::read(Path::new("/nonexistent/input.csv")).err().unwrap();
        assert!(matches!(err, DesignError::Read { .. }));
    }
}
