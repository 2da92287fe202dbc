//! SQL UTF-8 Converter: detects the encoding of SQL scripts and converts them to UTF-8.

pub mod app;
pub mod config;
pub mod core;
pub mod transport;
pub mod utils;

use app::ConverterApp;
use eframe::egui;

pub fn run() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SQL UTF-8 Converter")
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([640.0, 420.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "SQL UTF-8 Converter",
        options,
        Box::new(|cc| {
            app::apply_theme(&cc.egui_ctx);
            Ok(Box::new(ConverterApp::new(cc)))
        }),
    )
}
