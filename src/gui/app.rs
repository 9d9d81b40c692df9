//! Rent Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::{AppConfig, CONFIG_FILE, CPI_EXRENT_LABEL, CPI_RENT_LABEL};
use crate::data::{load_rent_table, AuxiliarySeries, CpiLoader, RentLoader, RentTable};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::view::{compute_view, ChartView, DashboardView};
use anyhow::Context;
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;

/// Exported image dimensions.
const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 1000;

/// Rent CSV loading result from background thread
enum LoadResult {
    Complete { path: PathBuf, table: RentTable },
    Error(String),
}

/// Main application window.
pub struct RentDashApp {
    config: AppConfig,
    loader: RentLoader,
    cpi_loader: CpiLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    /// Path of the table currently shown, once a load completed.
    rent_path: Option<PathBuf>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl RentDashApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load(Path::new(CONFIG_FILE));
        let mut app = Self {
            config,
            loader: RentLoader::new(),
            cpi_loader: CpiLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            rent_path: None,
            load_rx: None,
            is_loading: false,
        };
        // Load the configured source on startup; a missing file just shows
        // an error status until the user browses for one.
        app.start_load(app.config.rent_csv.clone());
        app
    }

    /// Load a rent CSV on a background thread, or reuse the cached table.
    fn start_load(&mut self, path: PathBuf) {
        if self.is_loading {
            return;
        }
        if self.loader.get(&path).is_some() {
            self.control_panel.rent_csv = Some(path.clone());
            self.apply_loaded(path);
            return;
        }
        self.is_loading = true;
        self.control_panel.rent_csv = Some(path.clone());
        self.control_panel
            .set_status(&format!("Loading {}...", path.display()));

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || match load_rent_table(&path) {
            Ok(table) => {
                let _ = tx.send(LoadResult::Complete { path, table });
            }
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
            }
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete { path, table } => {
                        self.loader.insert(path.clone(), table);
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.apply_loaded(path);
                    }
                    LoadResult::Error(error) => {
                        log::error!("rent CSV load failed: {error}");
                        self.control_panel
                            .set_status(&format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Point the controls and viewer at a table already in the cache.
    fn apply_loaded(&mut self, path: PathBuf) {
        let Some(table) = self.loader.get(&path) else {
            return;
        };
        let cities = table.cities();
        let dates = table.dates();
        self.rent_path = Some(path);
        self.control_panel
            .update_table(cities, dates, &self.config.default_cities);
        self.control_panel.set_status(&format!(
            "Loaded {} cities, {} dates",
            self.control_panel.cities.len(),
            self.control_panel.dates.len()
        ));
        self.recompute();
    }

    /// Handle rent CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.chart_viewer.clear();
            self.start_load(path);
        }
    }

    /// Run one recomputation pass and hand the result to the viewer.
    fn recompute(&mut self) {
        let Some(path) = self.rent_path.clone() else {
            return;
        };

        // Make sure toggled overlays are in the CPI cache before borrowing
        // them for the view computation.
        if self.control_panel.show_cpi_rent {
            if let Err(e) = self
                .cpi_loader
                .load(&self.config.cpi_rent_csv, CPI_RENT_LABEL)
            {
                log::error!("CPI rent overlay load failed: {e}");
                self.control_panel.set_status(&format!("Error: {}", e));
                self.control_panel.show_cpi_rent = false;
            }
        }
        if self.control_panel.show_cpi_exrent {
            if let Err(e) = self
                .cpi_loader
                .load(&self.config.cpi_exrent_csv, CPI_EXRENT_LABEL)
            {
                log::error!("CPI ex-shelter overlay load failed: {e}");
                self.control_panel.set_status(&format!("Error: {}", e));
                self.control_panel.show_cpi_exrent = false;
            }
        }

        let Some(table) = self.loader.get(&path) else {
            return;
        };
        let mut overlays: Vec<&AuxiliarySeries> = Vec::new();
        if self.control_panel.show_cpi_rent {
            if let Some(series) = self.cpi_loader.get(&self.config.cpi_rent_csv) {
                overlays.push(series);
            }
        }
        if self.control_panel.show_cpi_exrent {
            if let Some(series) = self.cpi_loader.get(&self.config.cpi_exrent_csv) {
                overlays.push(series);
            }
        }

        match compute_view(table, &overlays, &self.control_panel.selection()) {
            Ok(view) => self.chart_viewer.set_view(view),
            Err(e) => {
                log::error!("view computation failed: {e}");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Handle PNG export - render the current charts to a file and open it.
    fn handle_export_png(&mut self) {
        let Some(DashboardView::Chart(chart)) = self.chart_viewer.view.clone() else {
            self.control_panel.set_status("No chart to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("rentdash_chart.png")
            .save_file()
        else {
            return; // User cancelled
        };

        match export_chart(&chart, &path) {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Exported {}", path.display()));
            }
            Err(e) => {
                log::error!("chart export failed: {e:#}");
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }
}

fn export_chart(chart: &ChartView, path: &Path) -> anyhow::Result<()> {
    crate::charts::StaticChartRenderer::render_png(chart, path, EXPORT_WIDTH, EXPORT_HEIGHT)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("rendering chart image")?;
    open::that(path).context("opening exported image")?;
    Ok(())
}

impl eframe::App for RentDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => self.recompute(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
