//! Rent Table Loader Module
//! Loads the wide rent-index CSV (regions as rows, months as columns) and
//! reshapes it into a date-indexed table using Polars.

use polars::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the date column in every reshaped table.
pub const DATE_COL: &str = "Date";

/// Identifier metadata columns dropped during reshaping.
const ID_COLUMNS: [&str; 7] = [
    "RegionID",
    "SizeRank",
    "RegionType",
    "StateName",
    "State",
    "Metro",
    "CountyName",
];

/// Column holding the city names; becomes the column axis after reshaping.
const REGION_COL: &str = "RegionName";

/// Number of region rows retained from the source file.
const REGION_ROWS: usize = 50;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Empty region name in row {0}")]
    EmptyRegion(usize),
    #[error("Expected at least {REGION_ROWS} data rows, found {0}")]
    TooFewRows(usize),
}

/// A date-indexed rent table: one `Date` string column plus one f64 column
/// per city. Internal gaps are linearly interpolated; values are rounded to
/// 2 decimals. Nulls remain only where interpolation cannot infer a value
/// (leading/trailing gaps).
#[derive(Debug, Clone)]
pub struct RentTable {
    frame: DataFrame,
}

impl RentTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    #[cfg(test)]
    pub(crate) fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// City names, sorted ascending.
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self
            .frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| name != DATE_COL)
            .collect();
        cities.sort();
        cities
    }

    /// Date index in chronological (file) order.
    pub fn dates(&self) -> Vec<String> {
        let Ok(column) = self.frame.column(DATE_COL) else {
            return Vec::new();
        };
        let Ok(ca) = column.str() else {
            return Vec::new();
        };
        ca.into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    }
}

/// Loads and caches rent tables keyed by file path. Source files are
/// treated as immutable for the process lifetime, so there is no
/// invalidation.
pub struct RentLoader {
    cache: HashMap<PathBuf, RentTable>,
}

impl Default for RentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RentLoader {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Cached table for a path, if one has been loaded or inserted.
    pub fn get(&self, path: &Path) -> Option<&RentTable> {
        self.cache.get(path)
    }

    /// Insert a table loaded elsewhere (e.g. on a background thread).
    pub fn insert(&mut self, path: PathBuf, table: RentTable) {
        self.cache.insert(path, table);
    }

    /// Load a rent table, reusing the cached result on repeat calls. The
    /// GUI splits this into [`load_rent_table`] + [`RentLoader::insert`] so
    /// the read can run off the UI thread.
    #[allow(dead_code)]
    pub fn load(&mut self, path: &Path) -> Result<&RentTable, LoaderError> {
        match self.cache.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => {
                log::debug!("rent table cache hit: {}", path.display());
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let table = load_rent_table(path)?;
                Ok(entry.insert(table))
            }
        }
    }
}

/// Read the wide CSV and reshape it into a [`RentTable`].
pub fn load_rent_table(path: &Path) -> Result<RentTable, LoaderError> {
    let wide = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .with_n_rows(Some(REGION_ROWS))
        .finish()?
        .collect()?;

    let table = reshape_wide(&wide)?;
    log::info!(
        "loaded rent table from {}: {} dates x {} cities",
        path.display(),
        table.frame().height(),
        table.frame().width().saturating_sub(1)
    );
    Ok(table)
}

/// Reshape the wide region-per-row frame: drop identifier columns, turn the
/// month headers into a `Date` column and each region into a city column,
/// then interpolate internal gaps and round to 2 decimals.
pub fn reshape_wide(wide: &DataFrame) -> Result<RentTable, LoaderError> {
    if wide.height() < REGION_ROWS {
        return Err(LoaderError::TooFewRows(wide.height()));
    }

    let names: Vec<String> = wide
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for required in ID_COLUMNS.iter().chain(std::iter::once(&REGION_COL)) {
        if !names.iter().any(|name| name == required) {
            return Err(LoaderError::MissingColumn(required.to_string()));
        }
    }

    // Everything that is neither an identifier nor the region name is a
    // month column; file order is chronological.
    let months: Vec<String> = names
        .iter()
        .filter(|name| name.as_str() != REGION_COL && !ID_COLUMNS.contains(&name.as_str()))
        .cloned()
        .collect();

    let regions = wide.column(REGION_COL)?;
    let mut cities: Vec<String> = Vec::with_capacity(wide.height());
    for row in 0..wide.height() {
        let value = regions.get(row)?;
        if value.is_null() {
            return Err(LoaderError::EmptyRegion(row));
        }
        cities.push(value.to_string().trim_matches('"').to_string());
    }

    // Transpose cell by cell: one pass per month column, filling every
    // city's value vector.
    let mut per_city: Vec<Vec<Option<f64>>> =
        vec![Vec::with_capacity(months.len()); cities.len()];
    for month in &months {
        let values_f64 = wide.column(month)?.cast(&DataType::Float64)?;
        let values_ca = values_f64.f64()?;
        for (row, values) in per_city.iter_mut().enumerate() {
            values.push(values_ca.get(row));
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(cities.len() + 1);
    columns.push(Column::new(DATE_COL.into(), months));
    for (city, values) in cities.iter().zip(per_city) {
        columns.push(Column::new(city.as_str().into(), values));
    }

    // Duplicate region names surface here as a construction error.
    let transposed = DataFrame::new(columns)?;

    let fill_exprs: Vec<Expr> = cities
        .iter()
        .map(|city| col(city.as_str()).interpolate(InterpolationMethod::Linear))
        .collect();
    let mut table = transposed.lazy().with_columns(fill_exprs).collect()?;

    for city in &cities {
        let rounded: Vec<Option<f64>> = table
            .column(city)?
            .f64()?
            .into_iter()
            .map(|v| v.map(round2))
            .collect();
        table.with_column(Column::new(city.as_str().into(), rounded))?;
    }

    Ok(RentTable { frame: table })
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
