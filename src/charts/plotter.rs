//! Chart Plotter Module
//! Creates the interactive rent-trend and percent-change visualizations
//! using egui_plot.

use crate::data::DATE_COL;
use crate::stats::{ChangeSign, SeriesChange};
use crate::view::ChartView;
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};
use polars::prelude::*;

/// Bar colors by change sign
pub const NEGATIVE_COLOR: Color32 = Color32::from_rgb(220, 53, 69); // Red
pub const NON_NEGATIVE_COLOR: Color32 = Color32::from_rgb(40, 167, 69); // Green

/// Color palette for line series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(121, 85, 72),   // Brown
];

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for a series by its column position.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Line chart of rent over time: x = date index (labelled with date
    /// strings), one line per series. Null cells break the line into
    /// separate segments instead of bridging the gap.
    pub fn draw_rent_chart(ui: &mut egui::Ui, view: &ChartView, height: f32) {
        let x_labels = view.dates();

        Plot::new("rent_lines")
            .height(height)
            .legend(Legend::default())
            .x_axis_label("Date")
            .y_axis_label("Average Rent (USD)")
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if mark.value >= 0.0 && idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let mut series_idx = 0;
                for column in view.table.get_columns() {
                    if column.name().as_str() == DATE_COL {
                        continue;
                    }
                    let Ok(values_f64) = column.cast(&DataType::Float64) else {
                        continue;
                    };
                    let Ok(values) = values_f64.f64() else {
                        continue;
                    };

                    let color = Self::series_color(series_idx);
                    series_idx += 1;

                    let mut segment: Vec<[f64; 2]> = Vec::new();
                    for (row, value) in values.into_iter().enumerate() {
                        match value {
                            Some(y) => segment.push([row as f64, y]),
                            None => {
                                Self::flush_segment(plot_ui, &mut segment, color, column.name());
                            }
                        }
                    }
                    Self::flush_segment(plot_ui, &mut segment, color, column.name());
                }
            });
    }

    fn flush_segment(
        plot_ui: &mut egui_plot::PlotUi,
        segment: &mut Vec<[f64; 2]>,
        color: Color32,
        name: &str,
    ) {
        if segment.is_empty() {
            return;
        }
        let points: PlotPoints = std::mem::take(segment).into_iter().collect();
        plot_ui.line(Line::new(points).color(color).width(1.5).name(name));
    }

    /// Horizontal percent-change bars, one per series, top-to-bottom in
    /// table column order. Negative changes are red, the rest green;
    /// series with an undefined change are skipped.
    pub fn draw_change_chart(ui: &mut egui::Ui, changes: &[SeriesChange], height: f32) {
        let count = changes.len();
        let y_labels: Vec<String> = changes.iter().map(|c| c.series.clone()).collect();

        Plot::new("percent_change")
            .height(height)
            .x_axis_label("Percent Change")
            .allow_scroll(false)
            .x_axis_formatter(|mark, _range| format!("{:.1}%", mark.value))
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if mark.value >= 0.0 && idx < y_labels.len() {
                    // Reversed so the first series reads from the top.
                    y_labels[count - 1 - idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, change) in changes.iter().enumerate() {
                    let Some(percent) = change.percent else {
                        continue;
                    };
                    let color = match change.sign {
                        Some(ChangeSign::Negative) => NEGATIVE_COLOR,
                        _ => NON_NEGATIVE_COLOR,
                    };
                    let bar = Bar::new((count - 1 - i) as f64, percent)
                        .width(0.6)
                        .fill(color)
                        .name(&change.series);
                    plot_ui.bar_chart(BarChart::new(vec![bar]).horizontal());
                }
            });
    }
}
