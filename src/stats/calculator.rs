//! Change Calculator Module
//! Computes the percent change of every series between the selection's
//! start and end dates.

use polars::prelude::*;
use thiserror::Error;

use crate::data::{round2, DATE_COL};

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Date '{0}' is not in the filtered table")]
    MissingDate(String),
}

/// Sign tag driving the bar color in the percent-change chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSign {
    Negative,
    NonNegative,
}

/// Percent change of one series between the start and end dates.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesChange {
    pub series: String,
    /// `(end - start) / start * 100`, rounded to 2 decimals. `None` when
    /// the start value is zero or either endpoint is null; such a series
    /// simply has no defined change and does not affect the others.
    pub percent: Option<f64>,
    pub sign: Option<ChangeSign>,
}

/// Derives the percent-change table from a filtered (and possibly joined)
/// table. Pure function of its inputs.
pub struct ChangeCalculator;

impl ChangeCalculator {
    /// One [`SeriesChange`] per non-date column, in column order.
    pub fn compute(
        table: &DataFrame,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<SeriesChange>, CalcError> {
        let dates = table.column(DATE_COL)?.str()?;
        let start_row = Self::row_of(dates, start_date)
            .ok_or_else(|| CalcError::MissingDate(start_date.to_string()))?;
        let end_row = Self::row_of(dates, end_date)
            .ok_or_else(|| CalcError::MissingDate(end_date.to_string()))?;

        let mut changes = Vec::with_capacity(table.width().saturating_sub(1));
        for column in table.get_columns() {
            if column.name().as_str() == DATE_COL {
                continue;
            }
            let values_f64 = column.cast(&DataType::Float64)?;
            let values = values_f64.f64()?;

            let percent = match (values.get(start_row), values.get(end_row)) {
                (Some(start), Some(end)) if start != 0.0 => {
                    Some(round2((end - start) / start * 100.0))
                }
                _ => None,
            };
            let sign = percent.map(|p| {
                if p < 0.0 {
                    ChangeSign::Negative
                } else {
                    ChangeSign::NonNegative
                }
            });

            changes.push(SeriesChange {
                series: column.name().to_string(),
                percent,
                sign,
            });
        }
        Ok(changes)
    }

    fn row_of(dates: &StringChunked, date: &str) -> Option<usize> {
        dates.into_iter().position(|v| v == Some(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(a: [Option<f64>; 2], b: [Option<f64>; 2]) -> DataFrame {
        DataFrame::new(vec![
            Column::new(DATE_COL.into(), vec!["2020-01-31", "2020-02-29"]),
            Column::new("A".into(), a.to_vec()),
            Column::new("B".into(), b.to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn computes_signed_percent_changes() {
        let table = table([Some(100.0), Some(110.0)], [Some(200.0), Some(190.0)]);
        let changes = ChangeCalculator::compute(&table, "2020-01-31", "2020-02-29").unwrap();

        assert_eq!(
            changes,
            vec![
                SeriesChange {
                    series: "A".to_string(),
                    percent: Some(10.0),
                    sign: Some(ChangeSign::NonNegative),
                },
                SeriesChange {
                    series: "B".to_string(),
                    percent: Some(-5.0),
                    sign: Some(ChangeSign::Negative),
                },
            ]
        );
    }

    #[test]
    fn zero_start_value_yields_no_change_for_that_series_only() {
        let table = table([Some(0.0), Some(110.0)], [Some(200.0), Some(190.0)]);
        let changes = ChangeCalculator::compute(&table, "2020-01-31", "2020-02-29").unwrap();

        assert_eq!(changes[0].percent, None);
        assert_eq!(changes[0].sign, None);
        assert_eq!(changes[1].percent, Some(-5.0));
    }

    #[test]
    fn null_endpoint_yields_no_change() {
        let table = table([None, Some(110.0)], [Some(200.0), None]);
        let changes = ChangeCalculator::compute(&table, "2020-01-31", "2020-02-29").unwrap();

        assert_eq!(changes[0].percent, None);
        assert_eq!(changes[1].percent, None);
    }

    #[test]
    fn compute_is_idempotent() {
        let table = table([Some(100.0), Some(103.3)], [Some(200.0), Some(190.0)]);
        let first = ChangeCalculator::compute(&table, "2020-01-31", "2020-02-29").unwrap();
        let second = ChangeCalculator::compute(&table, "2020-01-31", "2020-02-29").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_date_is_an_error() {
        let table = table([Some(100.0), Some(110.0)], [Some(200.0), Some(190.0)]);
        let err = ChangeCalculator::compute(&table, "2020-01-31", "2020-03-31").unwrap_err();
        assert!(matches!(err, CalcError::MissingDate(date) if date == "2020-03-31"));
    }
}
