//! Control Panel Widget
//! Left side panel with the data source, city, date-range, and overlay
//! controls.

use crate::data::Selection;
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

/// Left side control panel driving every recomputation.
pub struct ControlPanel {
    pub rent_csv: Option<PathBuf>,
    pub cities: Vec<String>,
    pub selected_cities: Vec<bool>,
    pub dates: Vec<String>,
    pub start_idx: usize,
    pub end_idx: usize,
    pub show_cpi_rent: bool,
    pub show_cpi_exrent: bool,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            rent_csv: None,
            cities: Vec::new(),
            selected_cities: Vec::new(),
            dates: Vec::new(),
            start_idx: 0,
            end_idx: 0,
            show_cpi_rent: false,
            show_cpi_exrent: false,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the controls for a freshly loaded table. Cities from
    /// `defaults` start checked; the date range spans the whole index.
    pub fn update_table(&mut self, cities: Vec<String>, dates: Vec<String>, defaults: &[String]) {
        self.selected_cities = cities
            .iter()
            .map(|city| defaults.iter().any(|d| d == city))
            .collect();
        self.cities = cities;
        self.start_idx = 0;
        self.end_idx = dates.len().saturating_sub(1);
        self.dates = dates;
        self.export_enabled = !self.cities.is_empty();
    }

    /// Current query, rebuilt from the control state on every interaction.
    pub fn selection(&self) -> Selection {
        Selection {
            cities: self
                .cities
                .iter()
                .zip(self.selected_cities.iter())
                .filter(|(_, &selected)| selected)
                .map(|(city, _)| city.clone())
                .collect(),
            start_date: self.dates.get(self.start_idx).cloned().unwrap_or_default(),
            end_date: self.dates.get(self.end_idx).cloned().unwrap_or_default(),
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏙 Rent Index Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .rent_csv
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.rent_csv.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Cities Section =====
        ui.label(RichText::new("🏠 Cities").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("city_list")
                    .max_height(180.0)
                    .show(ui, |ui| {
                        for (i, city) in self.cities.iter().enumerate() {
                            if i < self.selected_cities.len()
                                && ui.checkbox(&mut self.selected_cities[i], city).changed()
                            {
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.selected_cities.iter_mut().for_each(|v| *v = true);
                action = ControlPanelAction::SelectionChanged;
            }
            if ui.small_button("Clear All").clicked() {
                self.selected_cities.iter_mut().for_each(|v| *v = false);
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 80.0;
        let combo_width = 150.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Start Date:"));
            let selected = self.dates.get(self.start_idx).cloned().unwrap_or_default();
            ComboBox::from_id_salt("start_date")
                .width(combo_width)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for (i, date) in self.dates.iter().enumerate() {
                        if ui.selectable_label(self.start_idx == i, date).clicked() {
                            self.start_idx = i;
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("End Date:"));
            let selected = self.dates.get(self.end_idx).cloned().unwrap_or_default();
            ComboBox::from_id_salt("end_date")
                .width(combo_width)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for (i, date) in self.dates.iter().enumerate() {
                        if ui.selectable_label(self.end_idx == i, date).clicked() {
                            self.end_idx = i;
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Overlays Section =====
        ui.label(RichText::new("📈 National Overlays").size(14.0).strong());
        ui.add_space(5.0);

        if ui
            .checkbox(
                &mut self.show_cpi_rent,
                "CPI for Rent of Primary Residence",
            )
            .changed()
        {
            action = ControlPanelAction::SelectionChanged;
        }
        if ui
            .checkbox(
                &mut self.show_cpi_exrent,
                "CPI for All Items Less Shelter",
            )
            .changed()
        {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Status =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    SelectionChanged,
    ExportPng,
}
