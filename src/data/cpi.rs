//! CPI Series Loader Module
//! Loads monthly national CPI reference series (two-column CSVs) and keys
//! them by year-month for joining against the rent table.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the date column in the source files and of the truncated
/// year-month key column.
pub const SOURCE_DATE_COL: &str = "DATE";

#[derive(Error, Debug)]
pub enum CpiError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing '{SOURCE_DATE_COL}' column")]
    MissingDateColumn,
    #[error("Expected exactly one value column, found {0}")]
    AmbiguousValueColumn(usize),
    #[error("Row {row}: '{value}' is not a YYYY-MM-DD date")]
    BadDate { row: usize, value: String },
}

/// A monthly reference series: a `DATE` column truncated to `YYYY-MM` plus
/// one f64 column named by its display label.
#[derive(Debug, Clone)]
pub struct AuxiliarySeries {
    frame: DataFrame,
    label: String,
    by_month: HashMap<String, f64>,
}

impl AuxiliarySeries {
    #[allow(dead_code)]
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Value for a `YYYY-MM` key, if the series covers that month.
    pub fn value_for_month(&self, key: &str) -> Option<f64> {
        self.by_month.get(key).copied()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(label: &str, entries: &[(&str, f64)]) -> Self {
        let keys: Vec<String> = entries.iter().map(|(k, _)| k.to_string()).collect();
        let values: Vec<f64> = entries.iter().map(|(_, v)| *v).collect();
        let by_month = keys.iter().cloned().zip(values.iter().copied()).collect();
        let frame = DataFrame::new(vec![
            Column::new(SOURCE_DATE_COL.into(), keys),
            Column::new(label.into(), values),
        ])
        .unwrap();
        Self {
            frame,
            label: label.to_string(),
            by_month,
        }
    }
}

/// Loads and caches CPI series keyed by file path, mirroring the rent
/// loader's no-invalidation cache.
pub struct CpiLoader {
    cache: HashMap<PathBuf, AuxiliarySeries>,
}

impl Default for CpiLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CpiLoader {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Cached series for a path, if one has been loaded.
    pub fn get(&self, path: &Path) -> Option<&AuxiliarySeries> {
        self.cache.get(path)
    }

    /// Load a series, reusing the cached result on repeat calls.
    pub fn load(&mut self, path: &Path, label: &str) -> Result<&AuxiliarySeries, CpiError> {
        match self.cache.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => {
                log::debug!("CPI series cache hit: {}", path.display());
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let series = load_cpi_series(path, label)?;
                Ok(entry.insert(series))
            }
        }
    }
}

/// Read a two-column (`DATE`, value) CSV into an [`AuxiliarySeries`].
///
/// Every date is validated as `YYYY-MM-DD` before the key is truncated to
/// its first 7 characters; a malformed date fails the whole load. Keys are
/// not deduplicated.
pub fn load_cpi_series(path: &Path, label: &str) -> Result<AuxiliarySeries, CpiError> {
    let raw = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    let names: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    if !names.iter().any(|name| name == SOURCE_DATE_COL) {
        return Err(CpiError::MissingDateColumn);
    }
    let value_cols: Vec<&String> = names
        .iter()
        .filter(|name| name.as_str() != SOURCE_DATE_COL)
        .collect();
    if value_cols.len() != 1 {
        return Err(CpiError::AmbiguousValueColumn(value_cols.len()));
    }

    let dates = raw.column(SOURCE_DATE_COL)?.str()?;
    let mut keys: Vec<String> = Vec::with_capacity(raw.height());
    for (row, date) in dates.into_iter().enumerate() {
        let date = date.ok_or_else(|| CpiError::BadDate {
            row,
            value: String::new(),
        })?;
        let parsed =
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| CpiError::BadDate {
                row,
                value: date.to_string(),
            })?;
        keys.push(parsed.format("%Y-%m").to_string());
    }

    let values_f64 = raw.column(value_cols[0])?.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = values_f64.f64()?.into_iter().collect();

    let by_month: HashMap<String, f64> = keys
        .iter()
        .zip(values.iter())
        .filter_map(|(key, value)| value.map(|v| (key.clone(), v)))
        .collect();

    let frame = DataFrame::new(vec![
        Column::new(SOURCE_DATE_COL.into(), keys),
        Column::new(label.into(), values),
    ])?;

    log::info!(
        "loaded CPI series '{}' from {}: {} months",
        label,
        path.display(),
        frame.height()
    );

    Ok(AuxiliarySeries {
        frame,
        label: label.to_string(),
        by_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpi.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn truncates_dates_and_applies_label() {
        let (_dir, path) = write_csv(
            "DATE,CUUR0000SEHA\n2023-05-01,370.1\n2023-06-01,372.8\n2023-07-01,375.2\n",
        );
        let series = load_cpi_series(&path, "Average US City Rent").unwrap();

        assert_eq!(series.label(), "Average US City Rent");
        assert_eq!(series.frame().height(), 3);
        let keys = series.frame().column("DATE").unwrap().str().unwrap();
        assert_eq!(keys.get(0), Some("2023-05"));
        assert_eq!(series.value_for_month("2023-06"), Some(372.8));
        assert_eq!(series.value_for_month("2024-01"), None);
    }

    #[test]
    fn malformed_date_fails_the_load() {
        let (_dir, path) = write_csv("DATE,CUUR0000SEHA\n2023-05-01,370.1\n05/2023,372.8\n");
        let err = load_cpi_series(&path, "Average US City Rent").unwrap_err();
        assert!(matches!(
            err,
            CpiError::BadDate { row: 1, value } if value == "05/2023"
        ));
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let (_dir, path) = write_csv("when,CUUR0000SEHA\n2023-05-01,370.1\n");
        assert!(matches!(
            load_cpi_series(&path, "x"),
            Err(CpiError::MissingDateColumn)
        ));
    }

    #[test]
    fn extra_value_columns_are_rejected() {
        let (_dir, path) = write_csv("DATE,a,b\n2023-05-01,1.0,2.0\n");
        assert!(matches!(
            load_cpi_series(&path, "x"),
            Err(CpiError::AmbiguousValueColumn(2))
        ));
    }

    #[test]
    fn loader_caches_by_path() {
        let (_dir, path) = write_csv("DATE,CUUR0000SEHA\n2023-05-01,370.1\n");
        let mut loader = CpiLoader::new();
        loader.load(&path, "Average US City Rent").unwrap();

        std::fs::remove_file(&path).unwrap();
        let cached = loader.load(&path, "Average US City Rent").unwrap();
        assert_eq!(cached.value_for_month("2023-05"), Some(370.1));
    }
}
