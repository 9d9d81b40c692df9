//! Rent Index Dashboard
//!
//! A Rust application for exploring city rent-index trends with national
//! CPI overlays and a derived percent-change chart.

mod charts;
mod config;
mod data;
mod gui;
mod stats;
mod view;

use eframe::egui;
use gui::RentDashApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 850.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Rent Index Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Rent Index Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(RentDashApp::new(cc)))),
    )
}
