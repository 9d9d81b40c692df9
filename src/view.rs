//! View Composer Module
//! Turns a user selection into chart-ready data, decoupled from any UI.

use polars::prelude::DataFrame;
use thiserror::Error;

use crate::data::{AuxiliarySeries, RentTable, SelectError, Selection, TableSelector};
use crate::stats::{CalcError, ChangeCalculator, SeriesChange};

/// Message shown when the selection's date range cannot be charted.
pub const DATE_RANGE_GUIDANCE: &str = "Please pick an end date that comes after the start date";

#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Calc(#[from] CalcError),
}

/// Chart-ready output of one recomputation pass.
#[derive(Debug, Clone)]
pub struct ChartView {
    /// Filtered rent table, extended by any joined overlay columns.
    pub table: DataFrame,
    /// Percent change per series between the selection's endpoints.
    pub changes: Vec<SeriesChange>,
}

impl ChartView {
    /// Date strings of the filtered range, in row order.
    pub fn dates(&self) -> Vec<String> {
        let Ok(column) = self.table.column(crate::data::DATE_COL) else {
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

/// Result of [`compute_view`]: either chart data or a guidance message.
#[derive(Debug, Clone)]
pub enum DashboardView {
    Chart(ChartView),
    Guidance(&'static str),
}

/// The single recomputation pass: filter, join enabled overlays in order,
/// derive percent changes. Pure function of its inputs; the UI calls it on
/// every control change.
pub fn compute_view(
    rent: &RentTable,
    overlays: &[&AuxiliarySeries],
    selection: &Selection,
) -> Result<DashboardView, ViewError> {
    if !selection.has_valid_range() {
        return Ok(DashboardView::Guidance(DATE_RANGE_GUIDANCE));
    }

    let mut table = TableSelector::filter(rent, selection)?;
    for series in overlays {
        TableSelector::join_series(&mut table, series)?;
    }
    let changes = ChangeCalculator::compute(&table, &selection.start_date, &selection.end_date)?;

    Ok(DashboardView::Chart(ChartView { table, changes }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DATE_COL;
    use crate::stats::ChangeSign;
    use polars::prelude::*;

    fn rent_table() -> RentTable {
        let frame = DataFrame::new(vec![
            Column::new(
                DATE_COL.into(),
                vec!["2023-05-15", "2023-06-15", "2023-07-15"],
            ),
            Column::new(
                "Chicago".into(),
                vec![Some(1800.0), Some(1820.0), Some(1845.0)],
            ),
            Column::new(
                "Austin".into(),
                vec![Some(1500.0), Some(1510.0), Some(1495.0)],
            ),
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
    fn equal_dates_yield_guidance_not_charts() {
        let view = compute_view(
            &rent_table(),
            &[],
            &selection(&["Austin"], "2023-05-15", "2023-05-15"),
        )
        .unwrap();
        assert!(matches!(view, DashboardView::Guidance(DATE_RANGE_GUIDANCE)));
    }

    #[test]
    fn reversed_dates_yield_guidance() {
        let view = compute_view(
            &rent_table(),
            &[],
            &selection(&["Austin"], "2023-07-15", "2023-05-15"),
        )
        .unwrap();
        assert!(matches!(view, DashboardView::Guidance(_)));
    }

    #[test]
    fn full_pipeline_with_overlay() {
        let cpi = AuxiliarySeries::from_parts(
            "Average US City Rent",
            &[("2023-05", 100.0), ("2023-07", 104.0)],
        );
        let view = compute_view(
            &rent_table(),
            &[&cpi],
            &selection(&["Austin", "Chicago"], "2023-05-15", "2023-07-15"),
        )
        .unwrap();

        let DashboardView::Chart(chart) = view else {
            panic!("expected chart data");
        };
        assert_eq!(chart.table.width(), 4);

        let series: Vec<&str> = chart.changes.iter().map(|c| c.series.as_str()).collect();
        assert_eq!(series, vec!["Austin", "Chicago", "Average US City Rent"]);

        assert_eq!(chart.changes[0].percent, Some(-0.33));
        assert_eq!(chart.changes[0].sign, Some(ChangeSign::Negative));
        assert_eq!(chart.changes[1].percent, Some(2.5));
        assert_eq!(chart.changes[1].sign, Some(ChangeSign::NonNegative));
        assert_eq!(chart.changes[2].percent, Some(4.0));
    }

    #[test]
    fn empty_city_selection_still_charts_overlays() {
        let cpi = AuxiliarySeries::from_parts(
            "CPI Excluding Shelter",
            &[("2023-05", 300.0), ("2023-07", 297.0)],
        );
        let view = compute_view(
            &rent_table(),
            &[&cpi],
            &selection(&[], "2023-05-15", "2023-07-15"),
        )
        .unwrap();

        let DashboardView::Chart(chart) = view else {
            panic!("expected chart data");
        };
        assert_eq!(chart.table.width(), 2);
        assert_eq!(chart.changes.len(), 1);
        assert_eq!(chart.changes[0].percent, Some(-1.0));
    }

    #[test]
    fn empty_selection_without_overlays_has_no_series() {
        let view = compute_view(
            &rent_table(),
            &[],
            &selection(&[], "2023-05-15", "2023-07-15"),
        )
        .unwrap();
        let DashboardView::Chart(chart) = view else {
            panic!("expected chart data");
        };
        assert_eq!(chart.table.width(), 1);
        assert!(chart.changes.is_empty());
    }
}
