//! Table Selector Module
//! Filters the rent table to a city subset and date range, and appends CPI
//! overlay series by truncated month key (left-join semantics).

use polars::prelude::*;
use thiserror::Error;

use super::cpi::AuxiliarySeries;
use super::loader::{RentTable, DATE_COL};

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unknown city '{0}'")]
    UnknownCity(String),
    #[error("Date '{0}' is not in the table index")]
    UnknownDate(String),
}

/// A user query against the rent table. Rebuilt on every interaction.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub cities: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

impl Selection {
    /// True when the start date strictly precedes the end date. Both
    /// endpoints are members of the ISO-formatted date index, where
    /// lexicographic order is chronological.
    pub fn has_valid_range(&self) -> bool {
        self.start_date < self.end_date
    }
}

/// Filtering and joining operations on loaded tables.
pub struct TableSelector;

impl TableSelector {
    /// Restrict the table to the selection's cities and inclusive date
    /// range. Rows keep chronological order; city columns are sorted
    /// ascending. An empty city set yields a table with only the `Date`
    /// column.
    pub fn filter(table: &RentTable, selection: &Selection) -> Result<DataFrame, SelectError> {
        let frame = table.frame();

        let known: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        for city in &selection.cities {
            if !known.iter().any(|name| name == city) {
                return Err(SelectError::UnknownCity(city.clone()));
            }
        }
        let dates = table.dates();
        for date in [&selection.start_date, &selection.end_date] {
            if !dates.iter().any(|d| d == date) {
                return Err(SelectError::UnknownDate(date.clone()));
            }
        }

        let mut cities = selection.cities.clone();
        cities.sort();
        let mut keep: Vec<String> = Vec::with_capacity(cities.len() + 1);
        keep.push(DATE_COL.to_string());
        keep.extend(cities);

        let filtered = frame
            .clone()
            .lazy()
            .filter(
                col(DATE_COL)
                    .gt_eq(lit(selection.start_date.clone()))
                    .and(col(DATE_COL).lt_eq(lit(selection.end_date.clone()))),
            )
            .collect()?
            .select(keep)?;

        Ok(filtered)
    }

    /// Append an overlay series as a new column: each row's date truncated
    /// to `YYYY-MM` is looked up in the series, unmatched months stay null.
    /// The truncated key itself never appears in the output.
    pub fn join_series(
        filtered: &mut DataFrame,
        series: &AuxiliarySeries,
    ) -> Result<(), SelectError> {
        let dates = filtered.column(DATE_COL)?.str()?;
        let values: Vec<Option<f64>> = dates
            .into_iter()
            .map(|date| {
                date.filter(|d| d.is_char_boundary(7))
                    .and_then(|d| series.value_for_month(&d[..7]))
            })
            .collect();
        filtered.with_column(Column::new(series.label().into(), values))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rent_table() -> RentTable {
        let frame = DataFrame::new(vec![
            Column::new(
                DATE_COL.into(),
                vec!["2023-05-15", "2023-06-15", "2023-07-15"],
            ),
            Column::new("Chicago".into(), vec![Some(1800.0), Some(1820.0), None]),
            Column::new("Austin".into(), vec![Some(1500.0), Some(1510.0), Some(1495.0)]),
        ])
        .unwrap();
        RentTable::from_frame(frame)
    }

    fn selection(cities: &[&str], start: &str, end: &str) -> Selection {
        Selection {
            cities: cities.iter().map(|c| c.to_string()).collect(),
            start_date: start.to_string(),
            end_date: end.to_string(),
        }
    }

    #[test]
    fn empty_city_set_yields_date_only_table() {
        let filtered =
            TableSelector::filter(&rent_table(), &selection(&[], "2023-05-15", "2023-07-15"))
                .unwrap();
        assert_eq!(filtered.width(), 1);
        assert_eq!(filtered.height(), 3);
    }

    #[test]
    fn full_selection_round_trips_up_to_column_order() {
        let table = rent_table();
        let filtered = TableSelector::filter(
            &table,
            &selection(&["Chicago", "Austin"], "2023-05-15", "2023-07-15"),
        )
        .unwrap();

        let names: Vec<String> = filtered
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Date", "Austin", "Chicago"]);
        assert_eq!(filtered.height(), table.frame().height());

        for city in ["Austin", "Chicago"] {
            let got: Vec<Option<f64>> = filtered
                .column(city)
                .unwrap()
                .f64()
                .unwrap()
                .into_iter()
                .collect();
            let want: Vec<Option<f64>> = table
                .frame()
                .column(city)
                .unwrap()
                .f64()
                .unwrap()
                .into_iter()
                .collect();
            assert_eq!(got, want);
        }
    }

    #[test]
    fn date_range_is_inclusive() {
        let filtered = TableSelector::filter(
            &rent_table(),
            &selection(&["Austin"], "2023-05-15", "2023-06-15"),
        )
        .unwrap();
        assert_eq!(filtered.height(), 2);
        let austin = filtered.column("Austin").unwrap().f64().unwrap();
        assert_eq!(austin.get(0), Some(1500.0));
        assert_eq!(austin.get(1), Some(1510.0));
    }

    #[test]
    fn unknown_city_is_an_error() {
        let err = TableSelector::filter(
            &rent_table(),
            &selection(&["Atlantis"], "2023-05-15", "2023-06-15"),
        )
        .unwrap_err();
        assert!(matches!(err, SelectError::UnknownCity(name) if name == "Atlantis"));
    }

    #[test]
    fn join_matches_by_truncated_month_key() {
        let mut filtered = TableSelector::filter(
            &rent_table(),
            &selection(&["Austin"], "2023-05-15", "2023-07-15"),
        )
        .unwrap();
        let series = AuxiliarySeries::from_parts(
            "Average US City Rent",
            &[("2023-05", 370.1), ("2023-06", 372.8)],
        );
        TableSelector::join_series(&mut filtered, &series).unwrap();

        let joined = filtered
            .column("Average US City Rent")
            .unwrap()
            .f64()
            .unwrap();
        assert_eq!(joined.get(0), Some(370.1));
        assert_eq!(joined.get(1), Some(372.8));
        // 2023-07 has no match: left-join semantics leave a null.
        assert_eq!(joined.get(2), None);

        // The helper month key is not part of the output.
        assert!(filtered.column("__month").is_err());
    }

    #[test]
    fn joins_are_independent() {
        let mut filtered = TableSelector::filter(
            &rent_table(),
            &selection(&["Austin"], "2023-05-15", "2023-06-15"),
        )
        .unwrap();
        let rent = AuxiliarySeries::from_parts("Average US City Rent", &[("2023-05", 370.1)]);
        let exrent = AuxiliarySeries::from_parts("CPI Excluding Shelter", &[("2023-06", 298.5)]);
        TableSelector::join_series(&mut filtered, &rent).unwrap();
        TableSelector::join_series(&mut filtered, &exrent).unwrap();

        assert_eq!(filtered.width(), 4);
        let a = filtered.column("Average US City Rent").unwrap().f64().unwrap();
        let b = filtered.column("CPI Excluding Shelter").unwrap().f64().unwrap();
        assert_eq!(a.get(0), Some(370.1));
        assert_eq!(a.get(1), None);
        assert_eq!(b.get(0), None);
        assert_eq!(b.get(1), Some(298.5));
    }
}
