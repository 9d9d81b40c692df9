//! Chart Viewer Widget
//! Central panel showing the rent line chart and the percent-change bar
//! chart for the current view, or a guidance message.

use crate::charts::ChartPlotter;
use crate::view::DashboardView;
use egui::{RichText, ScrollArea};

const LINE_CHART_HEIGHT: f32 = 340.0;
const BAR_CHART_HEIGHT: f32 = 280.0;

/// Central display area for the computed dashboard view.
pub struct ChartViewer {
    pub view: Option<DashboardView>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self { view: None }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the display (e.g. while a new file loads).
    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    /// Draw the current view.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        match &self.view {
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
            }
            Some(DashboardView::Guidance(message)) => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(*message).size(16.0));
                });
            }
            Some(DashboardView::Chart(chart)) => {
                ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    ui.add_space(5.0);
                    ui.label(RichText::new("Rent of Cities Over Time").size(16.0).strong());
                    ui.add_space(5.0);
                    ChartPlotter::draw_rent_chart(ui, chart, LINE_CHART_HEIGHT);

                    ui.add_space(15.0);
                    ui.separator();
                    ui.add_space(10.0);

                    ui.label(RichText::new("Percent Change").size(16.0).strong());
                    ui.add_space(5.0);
                    ChartPlotter::draw_change_chart(ui, &chart.changes, BAR_CHART_HEIGHT);
                });
            }
        }
    }
}
