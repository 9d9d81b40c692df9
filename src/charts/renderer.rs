//! Static Chart Renderer
//! Exports the current dashboard view as a PNG image: the rent line chart
//! on top, the percent-change bar chart underneath.

use crate::data::DATE_COL;
use crate::stats::{ChangeSign, SeriesChange};
use crate::view::ChartView;
use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::DataType;
use std::path::Path;

const NEGATIVE_COLOR: RGBColor = RGBColor(220, 53, 69);
const NON_NEGATIVE_COLOR: RGBColor = RGBColor(40, 167, 69);

const LINE_PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(255, 87, 34),
    RGBColor(121, 85, 72),
];

/// Renders the dashboard view to a static image file.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write both charts into a single PNG at `path`.
    pub fn render_png(
        view: &ChartView,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (upper, lower) = root.split_vertically((height / 2) as i32);

        Self::draw_line_chart(&upper, view)?;
        Self::draw_change_chart(&lower, &view.changes)?;

        root.present()?;
        Ok(())
    }

    fn draw_line_chart(
        area: &DrawingArea<BitMapBackend, Shift>,
        view: &ChartView,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dates = view.dates();
        let n = dates.len();

        let mut series: Vec<(String, Vec<Option<f64>>)> = Vec::new();
        for column in view.table.get_columns() {
            if column.name().as_str() == DATE_COL {
                continue;
            }
            let values: Vec<Option<f64>> = column
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .collect();
            series.push((column.name().to_string(), values));
        }

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for value in series.iter().flat_map(|(_, values)| values.iter().flatten()) {
            y_min = y_min.min(*value);
            y_max = y_max.max(*value);
        }
        if !y_min.is_finite() {
            y_min = 0.0;
            y_max = 1.0;
        }
        let pad = ((y_max - y_min) * 0.05).max(1.0);

        let x_max = n.saturating_sub(1).max(1) as f64;
        let mut chart = ChartBuilder::on(area)
            .caption("Rent of Cities Over Time", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..x_max, (y_min - pad)..(y_max + pad))?;

        chart
            .configure_mesh()
            .x_labels(n.clamp(2, 8))
            .x_label_formatter(&|x| {
                let idx = x.round() as usize;
                dates.get(idx).cloned().unwrap_or_default()
            })
            .y_desc("Average Rent (USD)")
            .draw()?;

        for (idx, (name, values)) in series.iter().enumerate() {
            let color = LINE_PALETTE[idx % LINE_PALETTE.len()];
            let points: Vec<(f64, f64)> = values
                .iter()
                .enumerate()
                .filter_map(|(row, value)| value.map(|y| (row as f64, y)))
                .collect();
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))?
                .label(name.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .border_style(BLACK.mix(0.3))
            .background_style(WHITE.mix(0.8))
            .draw()?;
        Ok(())
    }

    fn draw_change_chart(
        area: &DrawingArea<BitMapBackend, Shift>,
        changes: &[SeriesChange],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let defined: Vec<(&SeriesChange, f64)> = changes
            .iter()
            .filter_map(|change| change.percent.map(|p| (change, p)))
            .collect();
        if defined.is_empty() {
            return Ok(());
        }

        let n = defined.len();
        let names: Vec<String> = defined
            .iter()
            .map(|(change, _)| change.series.clone())
            .collect();

        let mut x_min = 0.0f64;
        let mut x_max = 0.0f64;
        for (_, percent) in &defined {
            x_min = x_min.min(*percent);
            x_max = x_max.max(*percent);
        }
        let pad = ((x_max - x_min) * 0.1).max(1.0);

        let mut chart = ChartBuilder::on(area)
            .caption("Percent Change", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(160)
            .build_cartesian_2d((x_min - pad)..(x_max + pad), -0.5f64..(n as f64 - 0.5))?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_label_formatter(&|x| format!("{x:.1}%"))
            .y_labels(n)
            .y_label_formatter(&|y| {
                let idx = y.round();
                if idx < 0.0 {
                    return String::new();
                }
                let idx = idx as usize;
                if idx < names.len() {
                    // Reversed so the first series reads from the top.
                    names[n - 1 - idx].clone()
                } else {
                    String::new()
                }
            })
            .draw()?;

        chart.draw_series(defined.iter().enumerate().map(|(i, (change, percent))| {
            let y = (n - 1 - i) as f64;
            let color = match change.sign {
                Some(ChangeSign::Negative) => NEGATIVE_COLOR,
                _ => NON_NEGATIVE_COLOR,
            };
            Rectangle::new([(0.0, y - 0.3), (*percent, y + 0.3)], color.filled())
        }))?;
        Ok(())
    }
}
